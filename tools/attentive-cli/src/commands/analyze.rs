//! Analyze a recorded frame stream synchronously.

use std::path::PathBuf;

use attentive_common::clock::FrameGate;
use attentive_common::config::AppConfig;
use attentive_processing_core::{ConcentrationDetector, FrameOutcome};
use attentive_session_engine::{JsonlFrameSource, LandmarkSource};

use super::print_report;

pub fn run(path: PathBuf, config: AppConfig, json: bool) -> anyhow::Result<()> {
    let mut detector = ConcentrationDetector::new(config.detector)?;
    let mut gate = FrameGate::new(detector.config().timing.frame_skip);
    let mut source = JsonlFrameSource::open(&path)?;

    if !json {
        println!("Analyzing frames from: {}", path.display());
        if let Some(header) = source.header() {
            println!(
                "  Source: {} @ {}fps ({} landmarks)",
                header.source, header.fps, header.landmark_count
            );
        }
    }

    let mut calibration_frames = 0u64;
    let mut incomplete = 0u64;
    while let Some(frame) = source.next_frame()? {
        if !gate.admit() {
            continue;
        }
        if let Err(e) = detector.check_frame(&frame) {
            incomplete += 1;
            tracing::debug!(error = %e, "Incomplete frame");
        }
        if let FrameOutcome::Calibrating { .. } = detector.process(&frame) {
            calibration_frames += 1;
        }
    }
    source.release()?;

    if !detector.is_calibrated() {
        tracing::warn!(
            required = detector.config().calibration_frames,
            "Stream ended before calibration completed"
        );
    }

    let report = detector.report();
    if !json {
        println!("  Frames read: {}", gate.frames_seen());
        println!("  Calibration frames: {calibration_frames}");
        if incomplete > 0 {
            println!("  Incomplete frames: {incomplete}");
        }
        if source.lines_skipped() > 0 {
            println!("  Malformed lines skipped: {}", source.lines_skipped());
        }
        println!();
    }
    print_report(&report, json)
}
