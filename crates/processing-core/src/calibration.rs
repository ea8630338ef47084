//! One-shot baseline calibration.
//!
//! Collects anchor positions while the subject looks at the screen normally
//! and freezes their mean as the baseline. Once complete the baseline never
//! changes for the life of the session; only an explicit [`reset`] starts over.
//!
//! [`reset`]: CalibrationManager::reset

use attentive_model::Point3D;

/// Calibration lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationState {
    Collecting { samples: Vec<Point3D> },
    Complete { baseline: Point3D },
}

/// Result of offering a sample to the manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationProgress {
    Collecting { collected: usize, required: usize },
    /// This sample completed calibration.
    Completed { baseline: Point3D },
    /// Calibration had already completed; the sample was ignored.
    AlreadyComplete,
}

#[derive(Debug, Clone)]
pub struct CalibrationManager {
    required: usize,
    state: CalibrationState,
}

impl CalibrationManager {
    /// `required` is clamped to at least one sample.
    pub fn new(required: usize) -> Self {
        let required = required.max(1);
        Self {
            required,
            state: CalibrationState::Collecting {
                samples: Vec::with_capacity(required),
            },
        }
    }

    pub fn add_sample(&mut self, anchor: Point3D) -> CalibrationProgress {
        let CalibrationState::Collecting { samples } = &mut self.state else {
            return CalibrationProgress::AlreadyComplete;
        };

        samples.push(anchor);
        if samples.len() < self.required {
            return CalibrationProgress::Collecting {
                collected: samples.len(),
                required: self.required,
            };
        }

        // `samples` holds exactly `required` (>= 1) points here.
        let baseline = Point3D::mean(samples).unwrap_or(anchor);
        self.state = CalibrationState::Complete { baseline };
        tracing::info!(
            samples = self.required,
            x = baseline.x,
            y = baseline.y,
            z = baseline.z,
            "Calibration complete"
        );
        CalibrationProgress::Completed { baseline }
    }

    pub fn baseline(&self) -> Option<Point3D> {
        match self.state {
            CalibrationState::Complete { baseline } => Some(baseline),
            CalibrationState::Collecting { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, CalibrationState::Complete { .. })
    }

    pub fn collected(&self) -> usize {
        match &self.state {
            CalibrationState::Collecting { samples } => samples.len(),
            CalibrationState::Complete { .. } => self.required,
        }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    /// Discard the baseline and start collecting again.
    pub fn reset(&mut self) {
        self.state = CalibrationState::Collecting {
            samples: Vec::with_capacity(self.required),
        };
    }
}
