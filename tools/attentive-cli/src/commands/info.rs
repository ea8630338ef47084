//! Show frame stream information.

use std::path::PathBuf;

use attentive_model::LandmarkLayout;
use attentive_session_engine::{JsonlFrameSource, LandmarkSource};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let mut source = JsonlFrameSource::open(&path)?;
    let layout = LandmarkLayout::FACE_MESH;

    println!("Frame stream: {}", path.display());
    match source.header() {
        Some(header) => {
            println!("  Schema: {}", header.schema_version);
            println!("  Source: {}", header.source);
            println!("  FPS: {}", header.fps);
            println!("  Landmarks per frame: {}", header.landmark_count);
            if let Some(ref started) = header.started_at {
                println!("  Started: {started}");
            }
        }
        None => println!("  (no header)"),
    }
    println!();

    let mut face = 0u64;
    let mut no_face = 0u64;
    let mut incomplete = 0u64;
    let mut first_ns = None;
    let mut last_ns = 0u64;
    while let Some(frame) = source.next_frame()? {
        first_ns.get_or_insert(frame.timestamp_ns);
        last_ns = frame.timestamp_ns;
        if frame.has_face() {
            face += 1;
            if !layout.missing_indices(&frame).is_empty() {
                incomplete += 1;
            }
        } else {
            no_face += 1;
        }
    }
    source.release()?;

    let span_ns = last_ns.saturating_sub(first_ns.unwrap_or(0));
    println!("Frames:");
    println!("  Total: {}", face + no_face);
    println!("  With face: {face}");
    println!("  Without face: {no_face}");
    if incomplete > 0 {
        println!(
            "  Missing face-mesh landmarks: {incomplete} (need {} points)",
            layout.required_len()
        );
    }
    if source.lines_skipped() > 0 {
        println!("  Malformed lines: {}", source.lines_skipped());
    }
    println!("  Span: {:.2}s", span_ns as f64 / 1_000_000_000.0);

    Ok(())
}
