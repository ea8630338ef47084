use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use attentive_common::config::{DetectorConfig, WeightingPreset};
use attentive_common::error::{AttentiveError, AttentiveResult};
use attentive_model::synthetic::{SyntheticFace, SyntheticPattern};
use attentive_model::{FrameStreamHeader, LandmarkFrame, LandmarkLayout};
use attentive_session_engine::{
    FrameWriter, JsonlFrameSource, LandmarkSource, MonitorSession, ReleaseHandle, ReplaySource,
    SessionConfig, SessionState,
};

const FRAME_NS: u64 = 33_333_333;

/// Produces a steady face until released, recording the release.
struct EndlessSource {
    next: u64,
    delay: Duration,
    released: Arc<AtomicBool>,
}

impl EndlessSource {
    fn new(delay: Duration) -> (Self, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let source = Self {
            next: 0,
            delay,
            released: released.clone(),
        };
        (source, released)
    }
}

impl LandmarkSource for EndlessSource {
    fn next_frame(&mut self) -> AttentiveResult<Option<LandmarkFrame>> {
        std::thread::sleep(self.delay);
        if self.released.load(Ordering::SeqCst) {
            return Err(AttentiveError::source("camera closed"));
        }
        let frame = SyntheticFace::default().frame(self.next * FRAME_NS, &LandmarkLayout::FACE_MESH);
        self.next += 1;
        Ok(Some(frame))
    }

    fn name(&self) -> &str {
        "endless"
    }

    fn release(&mut self) -> AttentiveResult<()> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release_handle(&self) -> Option<ReleaseHandle> {
        let released = self.released.clone();
        Some(ReleaseHandle::new(move || released.store(true, Ordering::SeqCst)))
    }
}

/// Fails after a fixed number of frames, like a camera being unplugged.
struct FailingSource {
    remaining: usize,
    released: Arc<AtomicUsize>,
}

impl LandmarkSource for FailingSource {
    fn next_frame(&mut self) -> AttentiveResult<Option<LandmarkFrame>> {
        if self.remaining == 0 {
            return Err(AttentiveError::source("camera disconnected"));
        }
        self.remaining -= 1;
        Ok(Some(LandmarkFrame::no_face(0)))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn release(&mut self) -> AttentiveResult<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn session_config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.detector.calibration_frames = 5;
    config.stop_timeout = Duration::from_secs(2);
    config
}

#[tokio::test]
async fn stop_flag_ends_endless_session_and_releases_source() {
    let (source, released) = EndlessSource::new(Duration::from_millis(1));
    let mut session = MonitorSession::new(session_config());
    session.start(Box::new(source)).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let report = session.stop().await.unwrap();

    assert_eq!(session.state(), SessionState::Stopped);
    assert!(released.load(Ordering::SeqCst));
    assert!(report.frames_analyzed > 0);
    assert!(session.latest_reading().is_some());
}

#[tokio::test]
async fn stop_is_bounded_when_worker_hangs() {
    // Each frame takes far longer than the stop timeout.
    let (source, released) = EndlessSource::new(Duration::from_millis(400));
    let mut config = session_config();
    config.stop_timeout = Duration::from_millis(20);
    let mut session = MonitorSession::new(config);
    session.start(Box::new(source)).unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    let started = std::time::Instant::now();
    let result = session.stop().await;

    assert!(matches!(
        result,
        Err(AttentiveError::StopTimeout { waited_ms: 20 })
    ));
    assert!(started.elapsed() < Duration::from_millis(300));
    assert_eq!(session.state(), SessionState::Error);
    // The worker is still inside its 400 ms read; release was forced.
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn stop_timeout_without_release_handle_still_returns() {
    struct SlowReplay(ReplaySource);

    impl LandmarkSource for SlowReplay {
        fn next_frame(&mut self) -> AttentiveResult<Option<LandmarkFrame>> {
            std::thread::sleep(Duration::from_millis(300));
            self.0.next_frame()
        }

        fn name(&self) -> &str {
            self.0.name()
        }
    }

    let mut config = session_config();
    config.stop_timeout = Duration::from_millis(20);
    let mut session = MonitorSession::new(config);
    let replay = ReplaySource::synthetic(
        SyntheticPattern::Focused,
        1_000,
        30.0,
        &LandmarkLayout::FACE_MESH,
    );
    session.start(Box::new(SlowReplay(replay))).unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    let result = session.stop().await;
    assert!(matches!(result, Err(AttentiveError::StopTimeout { .. })));
    assert_eq!(session.state(), SessionState::Error);
}

#[tokio::test]
async fn upstream_failure_ends_session_with_error() {
    let released = Arc::new(AtomicUsize::new(0));
    let source = FailingSource {
        remaining: 3,
        released: released.clone(),
    };
    let mut session = MonitorSession::new(session_config());
    session.start(Box::new(source)).unwrap();

    let result = session.wait().await;
    assert!(matches!(result, Err(AttentiveError::Source { .. })));
    assert_eq!(session.state(), SessionState::Error);
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert!(session.report().is_err());
}

#[tokio::test]
async fn duration_limit_ends_session() {
    let (source, released) = EndlessSource::new(Duration::from_millis(1));
    let mut config = session_config();
    config.max_duration = Some(Duration::from_millis(80));
    let mut session = MonitorSession::new(config);
    session.start(Box::new(source)).unwrap();

    let report = tokio::time::timeout(Duration::from_secs(5), session.wait())
        .await
        .expect("session should end on its own")
        .unwrap();
    assert_eq!(session.state(), SessionState::Stopped);
    assert!(released.load(Ordering::SeqCst));
    assert!(report.total_time_secs > 0.0);
}

#[tokio::test]
async fn frame_skip_analyzes_every_other_frame() {
    let mut config = session_config();
    config.detector = DetectorConfig::preset(WeightingPreset::Lightweight);
    config.detector.calibration_frames = 10;
    let mut session = MonitorSession::new(config);

    let source = ReplaySource::synthetic(
        SyntheticPattern::Focused,
        100,
        30.0,
        &LandmarkLayout::FACE_MESH,
    );
    session.start(Box::new(source)).unwrap();
    let report = session.wait().await.unwrap();

    // 50 admitted frames, 10 of them spent calibrating.
    assert_eq!(report.frames_analyzed, 40);
    let expected_secs = 40.0 * 2.0 / 30.0;
    assert!((report.total_time_secs - expected_secs).abs() < 1e-9);
}

#[tokio::test]
async fn recorded_stream_replays_through_session() {
    let dir = std::env::temp_dir().join("attentive_test_monitor_jsonl");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("mixed.jsonl");

    let layout = LandmarkLayout::FACE_MESH;
    let header = FrameStreamHeader::new("synthetic", 30.0, LandmarkLayout::FACE_MESH_POINTS);
    {
        let mut writer = FrameWriter::create(&path, &header).unwrap();
        for frame in attentive_model::synthetic::generate_frames(
            SyntheticPattern::Mixed,
            300,
            30.0,
            &layout,
        ) {
            writer.write_frame(&frame).unwrap();
        }
    }

    let mut session = MonitorSession::new(session_config());
    session
        .start(Box::new(JsonlFrameSource::open(&path).unwrap()))
        .unwrap();
    let report = session.wait().await.unwrap();

    // The first 5 frames calibrate.
    assert_eq!(report.frames_analyzed, 295);
    let shares: f64 = report
        .concentration_levels
        .values()
        .map(|share| share.percentage)
        .sum();
    assert!((shares - 100.0).abs() < 1e-6);

    std::fs::remove_dir_all(&dir).ok();
}
