//! Run a background monitoring session.

use std::path::PathBuf;
use std::time::Duration;

use attentive_common::config::AppConfig;
use attentive_model::{ConcentrationLevel, WorkingStatus};
use attentive_session_engine::{JsonlFrameSource, MonitorSession, SessionConfig};

use super::print_report;

pub async fn run(
    path: PathBuf,
    mut app: AppConfig,
    minutes: Option<f64>,
    realtime: bool,
    stop_timeout_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    if minutes.is_some() {
        app.session.max_duration_minutes = minutes;
    }
    if realtime {
        app.session.realtime = true;
    }
    if let Some(ms) = stop_timeout_ms {
        app.session.stop_timeout_ms = ms;
    }
    let session_config = SessionConfig::from_app(&app);

    println!("Monitoring frames from: {}", path.display());
    if let Some(max) = session_config.max_duration {
        println!("  Duration limit: {:.1} min", max.as_secs_f64() / 60.0);
    }
    println!("  Realtime: {}", session_config.realtime);
    println!(
        "  Calibrating on the first {} face frames",
        session_config.detector.calibration_frames
    );
    println!("Press Ctrl+C to stop monitoring...");
    println!();

    let source = JsonlFrameSource::open(&path)?;
    let mut session = MonitorSession::new(session_config);
    session.start(Box::new(source))?;

    let mut readings = session.subscribe();
    let mut shown: Option<(WorkingStatus, ConcentrationLevel)> = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let report = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                break session.stop().await?;
            }
            changed = readings.changed() => {
                if changed.is_err() {
                    // The worker dropped its sender: the stream ended.
                    break session.wait().await?;
                }
                let Some(reading) = *readings.borrow_and_update() else {
                    continue;
                };
                if shown != Some((reading.status, reading.level)) {
                    let progress = reading
                        .deep_progress
                        .map(|p| format!(", deep {:.0}%", p * 100.0))
                        .unwrap_or_default();
                    println!(
                        "[{:>8.2}s] {} / {} (score {:.2}{progress})",
                        Duration::from_nanos(reading.timestamp_ns).as_secs_f64(),
                        reading.status,
                        reading.level,
                        reading.composite,
                    );
                    shown = Some((reading.status, reading.level));
                }
            }
        }
    };

    println!();
    print_report(&report, json)
}
