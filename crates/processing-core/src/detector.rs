//! Concentration detector: one session's worth of analysis state.
//!
//! Owns the calibration, every rolling window, the level state machine and
//! the tallies. Frames are processed one at a time by a single owner; the
//! detector has no interior synchronization.
//!
//! Per frame:
//! 1. Resolve the landmark layout (missing face or indices = signal absence)
//! 2. While calibrating, feed the anchor to the calibration manager only
//! 3. Classify working status and record it for stability
//! 4. Score blink, expression and position; aggregate into the composite
//! 5. Advance the level state machine and tally the frame's time

use attentive_common::config::DetectorConfig;
use attentive_common::error::{AttentiveError, AttentiveResult};
use attentive_model::{
    ConcentrationLevel, FaceGeometry, FrameReading, LandmarkFrame, LandmarkLayout, Point3D,
    SessionReport, WorkingStatus,
};
use serde::Serialize;

use crate::aggregate::{Aggregator, ComponentScores};
use crate::calibration::{CalibrationManager, CalibrationProgress};
use crate::expression::ExpressionAnalyzer;
use crate::eye::BlinkAnalyzer;
use crate::level::LevelStateMachine;
use crate::position::PositionAnalyzer;
use crate::stability::StabilityAnalyzer;
use crate::tally::DurationTally;
use crate::working::WorkingStatusClassifier;

/// Result of one analyzed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameAnalysis {
    pub reading: FrameReading,
    /// Component scores; `None` for frames without a usable face.
    pub scores: Option<ComponentScores>,
}

/// What [`ConcentrationDetector::process`] did with a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The frame went to calibration; nothing was classified or tallied.
    Calibrating { collected: usize, required: usize },
    Analyzed(FrameAnalysis),
}

impl FrameOutcome {
    pub fn reading(&self) -> Option<&FrameReading> {
        match self {
            FrameOutcome::Analyzed(analysis) => Some(&analysis.reading),
            FrameOutcome::Calibrating { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConcentrationDetector {
    config: DetectorConfig,
    layout: LandmarkLayout,
    calibration: CalibrationManager,
    working: WorkingStatusClassifier,
    blink: BlinkAnalyzer,
    expression: ExpressionAnalyzer,
    position: PositionAnalyzer,
    stability: StabilityAnalyzer,
    aggregator: Aggregator,
    level: LevelStateMachine,
    tally: DurationTally,
    last_reading: Option<FrameReading>,
}

impl ConcentrationDetector {
    /// Detector for the face mesh layout.
    pub fn new(config: DetectorConfig) -> AttentiveResult<Self> {
        Self::with_layout(config, LandmarkLayout::FACE_MESH)
    }

    pub fn with_layout(config: DetectorConfig, layout: LandmarkLayout) -> AttentiveResult<Self> {
        config.validate()?;

        let frame_secs = config.timing.increment_secs();
        let windows = config.windows;
        Ok(Self {
            calibration: CalibrationManager::new(config.calibration_frames),
            working: WorkingStatusClassifier::new(config.working),
            blink: BlinkAnalyzer::new(config.blink, windows.blink, frame_secs),
            expression: ExpressionAnalyzer::new(config.expression, windows.expression),
            position: PositionAnalyzer::new(config.position, windows.position),
            stability: StabilityAnalyzer::new(windows.status),
            aggregator: Aggregator::new(config.weights),
            level: LevelStateMachine::new(config.level),
            tally: DurationTally::new(),
            last_reading: None,
            layout,
            config,
        })
    }

    /// Process one frame.
    pub fn process(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        let geometry = self.layout.extract(frame);
        if geometry.is_none() && frame.has_face() {
            tracing::warn!(
                t = frame.timestamp_ns,
                missing = ?self.layout.missing_indices(frame),
                "Frame lacks required landmarks, treating as no face"
            );
        }

        if !self.calibration.is_complete() {
            let collected = match geometry {
                Some(face) => match self.calibration.add_sample(face.nose_tip) {
                    CalibrationProgress::Collecting { collected, .. } => collected,
                    _ => self.calibration.required(),
                },
                None => self.calibration.collected(),
            };
            return FrameOutcome::Calibrating {
                collected,
                required: self.calibration.required(),
            };
        }

        let analysis = self.analyze(frame.timestamp_ns, geometry.as_ref());
        self.last_reading = Some(analysis.reading);
        FrameOutcome::Analyzed(analysis)
    }

    fn analyze(&mut self, timestamp_ns: u64, face: Option<&FaceGeometry>) -> FrameAnalysis {
        let status = self.working.classify(face);
        self.stability.record(status);

        let (level, composite, scores) = match face {
            Some(face) => {
                let scores = ComponentScores {
                    position: self.position.update(face.nose_tip, self.calibration.baseline()),
                    blink: self.blink.update(face).score,
                    expression: self.expression.update(face).smoothed,
                    stability: self.stability.score(),
                };
                let composite = self.aggregator.composite(&scores);
                let level = self.level.update(composite, timestamp_ns);
                (level, composite, Some(scores))
            }
            None => (self.level.drop_run(), 0.0, None),
        };

        self.tally
            .record(status, level, self.config.timing.increment_secs());

        FrameAnalysis {
            reading: FrameReading {
                timestamp_ns,
                status,
                level,
                composite,
                deep_progress: self.level.deep_progress(),
            },
            scores,
        }
    }

    /// Check that a face frame exposes every index of the layout.
    pub fn check_frame(&self, frame: &LandmarkFrame) -> AttentiveResult<()> {
        let missing = self.layout.missing_indices(frame);
        if frame.has_face() && !missing.is_empty() {
            return Err(AttentiveError::layout(format!(
                "frame at {} ns is missing landmark indices {:?}",
                frame.timestamp_ns, missing
            )));
        }
        Ok(())
    }

    /// Snapshot of the tallies so far.
    pub fn report(&self) -> SessionReport {
        self.tally.report()
    }

    pub fn last_reading(&self) -> Option<&FrameReading> {
        self.last_reading.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_complete()
    }

    pub fn baseline(&self) -> Option<Point3D> {
        self.calibration.baseline()
    }

    pub fn frames_analyzed(&self) -> u64 {
        self.tally.frames()
    }

    pub fn level(&self) -> ConcentrationLevel {
        self.level.level()
    }

    pub fn status_secs(&self, status: WorkingStatus) -> f64 {
        self.tally.status_secs(status)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn layout(&self) -> &LandmarkLayout {
        &self.layout
    }

    /// Return to the freshly constructed state, calibration included.
    pub fn reset(&mut self) {
        self.calibration.reset();
        self.blink.reset();
        self.expression.reset();
        self.position.reset();
        self.stability.reset();
        self.level.reset();
        self.tally.reset();
        self.last_reading = None;
    }
}
