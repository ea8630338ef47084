//! Monitoring session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use attentive_common::clock::{FrameGate, SessionClock};
use attentive_common::config::{AppConfig, DetectorConfig};
use attentive_common::error::{AttentiveError, AttentiveResult};
use attentive_model::{FrameReading, LandmarkLayout, SessionReport};
use attentive_processing_core::{ConcentrationDetector, FrameOutcome};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::source::{LandmarkSource, ReleaseHandle};

/// Configuration for one monitoring session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Detector settings.
    pub detector: DetectorConfig,

    /// Landmark indices the detector reads.
    pub layout: LandmarkLayout,

    /// End the session once the session clock passes this.
    pub max_duration: Option<Duration>,

    /// Pace frames at the detector's frame interval.
    pub realtime: bool,

    /// How long `stop` waits for the worker to exit.
    pub stop_timeout: Duration,
}

impl SessionConfig {
    /// Session settings from the application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            detector: config.detector.clone(),
            layout: LandmarkLayout::FACE_MESH,
            max_duration: config
                .session
                .max_duration_minutes
                .filter(|minutes| *minutes > 0.0)
                .map(|minutes| Duration::from_secs_f64(minutes * 60.0)),
            realtime: config.session.realtime,
            stop_timeout: Duration::from_millis(config.session.stop_timeout_ms),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_app(&AppConfig::default())
    }
}

/// State of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created but not started.
    Idle,
    /// Worker running.
    Monitoring,
    /// Worker finished and the report is available.
    Stopped,
    /// The worker failed or could not be stopped in time.
    Error,
}

/// Why the worker loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitReason {
    StopRequested,
    Exhausted,
    DurationReached,
}

/// A monitoring session that runs a detector on a background worker.
pub struct MonitorSession {
    config: SessionConfig,
    state: SessionState,
    clock: Option<SessionClock>,
    stop_flag: Arc<AtomicBool>,
    readings_tx: Option<watch::Sender<Option<FrameReading>>>,
    readings_rx: watch::Receiver<Option<FrameReading>>,
    worker: Option<JoinHandle<AttentiveResult<SessionReport>>>,
    release_handle: Option<ReleaseHandle>,
    report: Option<SessionReport>,
}

impl MonitorSession {
    /// Create a new session with the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        let (readings_tx, readings_rx) = watch::channel(None);
        Self {
            config,
            state: SessionState::Idle,
            clock: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            readings_tx: Some(readings_tx),
            readings_rx,
            worker: None,
            release_handle: None,
            report: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start monitoring `source` on tokio's blocking pool.
    ///
    /// Must be called from within a tokio runtime. The worker owns the
    /// source and a fresh detector until it exits.
    pub fn start(&mut self, source: Box<dyn LandmarkSource>) -> AttentiveResult<()> {
        if self.state != SessionState::Idle {
            return Err(AttentiveError::session("Session already started"));
        }
        let detector = ConcentrationDetector::with_layout(
            self.config.detector.clone(),
            self.config.layout.clone(),
        )?;
        let readings_tx = self
            .readings_tx
            .take()
            .ok_or_else(|| AttentiveError::session("Session already started"))?;

        let clock = SessionClock::start();
        let release_handle = source.release_handle();
        tracing::info!(
            source = %source.name(),
            started_at = %clock.epoch_wall(),
            frame_skip = self.config.detector.timing.frame_skip,
            realtime = self.config.realtime,
            "Starting monitoring session"
        );

        let worker = Worker {
            detector,
            source,
            gate: FrameGate::new(self.config.detector.timing.frame_skip),
            stop_flag: self.stop_flag.clone(),
            readings: readings_tx,
            clock: clock.clone(),
            max_duration: self.config.max_duration,
            pacing: self
                .config
                .realtime
                .then(|| Duration::from_secs_f64(self.config.detector.timing.frame_interval_secs)),
        };

        self.stop_flag.store(false, Ordering::SeqCst);
        self.worker = Some(tokio::task::spawn_blocking(move || worker.run()));
        self.release_handle = release_handle;
        self.clock = Some(clock);
        self.state = SessionState::Monitoring;
        Ok(())
    }

    /// Request cancellation and wait (bounded) for the worker's report.
    ///
    /// If the worker does not exit within the stop timeout it is abandoned,
    /// the source is force-released through its [`ReleaseHandle`] (when it
    /// has one) and [`AttentiveError::StopTimeout`] is returned.
    pub async fn stop(&mut self) -> AttentiveResult<SessionReport> {
        if self.state != SessionState::Monitoring {
            return Err(AttentiveError::session("Session not monitoring"));
        }
        let handle = self.take_worker()?;

        tracing::info!("Stopping monitoring session");
        self.stop_flag.store(true, Ordering::SeqCst);

        let timeout = self.config.stop_timeout;
        match tokio::time::timeout(timeout, handle).await {
            Ok(joined) => self.finish(joined),
            Err(_) => {
                let waited_ms = timeout.as_millis() as u64;
                tracing::warn!(waited_ms, "Worker did not stop in time, abandoning it");
                match self.release_handle.take() {
                    Some(handle) => {
                        handle.release();
                        tracing::warn!("Landmark source released without the worker");
                    }
                    None => tracing::warn!(
                        "Landmark source has no release handle, it is released when its current read returns"
                    ),
                }
                self.state = SessionState::Error;
                Err(AttentiveError::StopTimeout { waited_ms })
            }
        }
    }

    /// Wait for the session to end on its own (end of stream or duration limit).
    pub async fn wait(&mut self) -> AttentiveResult<SessionReport> {
        if self.state != SessionState::Monitoring {
            return Err(AttentiveError::session("Session not monitoring"));
        }
        let handle = self.take_worker()?;
        let joined = handle.await;
        self.finish(joined)
    }

    /// Whether the worker has exited (its report is ready to collect).
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_some_and(|handle| handle.is_finished())
    }

    /// Final report of a stopped session.
    pub fn report(&self) -> AttentiveResult<SessionReport> {
        self.report
            .clone()
            .ok_or_else(|| AttentiveError::session("Session has not produced a report"))
    }

    /// Most recent live reading.
    pub fn latest_reading(&self) -> Option<FrameReading> {
        *self.readings_rx.borrow()
    }

    /// Subscribe to live readings.
    pub fn subscribe(&self) -> watch::Receiver<Option<FrameReading>> {
        self.readings_rx.clone()
    }

    /// Get a clone of the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Session duration so far.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.as_ref().map(|c| c.elapsed_secs()).unwrap_or(0.0)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn take_worker(&mut self) -> AttentiveResult<JoinHandle<AttentiveResult<SessionReport>>> {
        self.worker
            .take()
            .ok_or_else(|| AttentiveError::session("Session has no running worker"))
    }

    fn finish(
        &mut self,
        joined: Result<AttentiveResult<SessionReport>, tokio::task::JoinError>,
    ) -> AttentiveResult<SessionReport> {
        self.release_handle = None;
        match joined {
            Ok(Ok(report)) => {
                tracing::info!(
                    duration_secs = self.elapsed_secs(),
                    analyzed_secs = report.total_time_secs,
                    frames = report.frames_analyzed,
                    "Monitoring session stopped"
                );
                self.state = SessionState::Stopped;
                self.report = Some(report.clone());
                Ok(report)
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Monitoring session failed");
                self.state = SessionState::Error;
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "Monitoring worker join failed");
                self.state = SessionState::Error;
                Err(AttentiveError::session(format!("Worker join failed: {e}")))
            }
        }
    }
}

/// Everything the background worker owns.
struct Worker {
    detector: ConcentrationDetector,
    source: Box<dyn LandmarkSource>,
    gate: FrameGate,
    stop_flag: Arc<AtomicBool>,
    readings: watch::Sender<Option<FrameReading>>,
    clock: SessionClock,
    max_duration: Option<Duration>,
    pacing: Option<Duration>,
}

impl Worker {
    fn run(mut self) -> AttentiveResult<SessionReport> {
        let outcome = self.run_loop();

        // The source is released on every exit path, before the report is handed back.
        if let Err(e) = self.source.release() {
            tracing::warn!(source = %self.source.name(), error = %e, "Failed to release landmark source");
        }

        let reason = outcome?;
        tracing::info!(
            ?reason,
            frames_seen = self.gate.frames_seen(),
            frames_analyzed = self.detector.frames_analyzed(),
            "Monitoring worker exiting"
        );
        Ok(self.detector.report())
    }

    fn run_loop(&mut self) -> AttentiveResult<ExitReason> {
        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                return Ok(ExitReason::StopRequested);
            }
            if let Some(max) = self.max_duration {
                if self.clock.elapsed_secs() >= max.as_secs_f64() {
                    return Ok(ExitReason::DurationReached);
                }
            }

            let Some(frame) = self.source.next_frame()? else {
                return Ok(ExitReason::Exhausted);
            };

            if self.gate.admit() {
                match self.detector.process(&frame) {
                    FrameOutcome::Analyzed(analysis) => {
                        self.readings.send_replace(Some(analysis.reading));
                    }
                    FrameOutcome::Calibrating { collected, required } => {
                        tracing::trace!(collected, required, "Calibrating");
                    }
                }
            }

            if let Some(interval) = self.pacing {
                std::thread::sleep(interval);
            }
        }
    }
}
