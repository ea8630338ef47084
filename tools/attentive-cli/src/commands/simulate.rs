//! Write a synthetic landmark stream.

use std::path::PathBuf;

use attentive_common::clock::SessionClock;
use attentive_model::synthetic::{generate_frames, SyntheticPattern};
use attentive_model::{FrameStreamHeader, LandmarkLayout};
use attentive_session_engine::FrameWriter;

pub fn run(output: PathBuf, frames: usize, fps: f64, pattern: String) -> anyhow::Result<()> {
    if fps <= 0.0 || !fps.is_finite() {
        anyhow::bail!("fps must be positive (got {fps})");
    }
    let pattern: SyntheticPattern = pattern.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let layout = LandmarkLayout::FACE_MESH;
    let mut header = FrameStreamHeader::new("synthetic", fps, LandmarkLayout::FACE_MESH_POINTS);
    header.started_at = Some(SessionClock::start().epoch_wall().to_string());

    println!("Generating {frames} {pattern:?} frames @ {fps}fps");

    let mut writer = FrameWriter::create(&output, &header)?;
    let mut no_face = 0usize;
    for frame in generate_frames(pattern, frames, fps, &layout) {
        if !frame.has_face() {
            no_face += 1;
        }
        writer.write_frame(&frame)?;
    }
    writer.flush()?;

    println!(
        "  Wrote {} frames ({} without a face) to: {}",
        writer.frames_written(),
        no_face,
        writer.path().display()
    );
    println!("  Duration: {:.1}s", frames as f64 / fps);
    Ok(())
}
