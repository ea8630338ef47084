//! Eyebrow and mouth geometry scoring.
//!
//! Both features are compared against resting targets; the blend is pushed
//! through a rolling window and the window mean is reported, which damps
//! single-frame detector jitter.

use attentive_common::config::ExpressionConfig;
use attentive_model::FaceGeometry;

use crate::window::SlidingWindow;

/// `1 - |target - value| * sensitivity`, floored at 0.
pub fn proximity_score(value: f64, target: f64, sensitivity: f64) -> f64 {
    (1.0 - (target - value).abs() * sensitivity).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpressionReading {
    pub eyebrow_score: f64,
    pub mouth_score: f64,
    /// This frame's blended score, before smoothing.
    pub instant: f64,
    /// Window mean reported to the aggregator.
    pub smoothed: f64,
}

#[derive(Debug, Clone)]
pub struct ExpressionAnalyzer {
    config: ExpressionConfig,
    window: SlidingWindow<f64>,
}

impl ExpressionAnalyzer {
    pub fn new(config: ExpressionConfig, capacity: usize) -> Self {
        Self {
            config,
            window: SlidingWindow::new(capacity),
        }
    }

    pub fn update(&mut self, face: &FaceGeometry) -> ExpressionReading {
        let c = &self.config;

        let eyebrow_y = (face.left_eyebrow.y + face.right_eyebrow.y) / 2.0;
        let eyebrow_score = proximity_score(eyebrow_y, c.eyebrow_target, c.eyebrow_sensitivity);

        let mouth_width = (face.mouth_right.x - face.mouth_left.x).abs();
        let mouth_score = proximity_score(mouth_width, c.mouth_target_width, c.mouth_sensitivity);

        let instant = c.eyebrow_weight * eyebrow_score + (1.0 - c.eyebrow_weight) * mouth_score;
        self.window.push(instant);

        ExpressionReading {
            eyebrow_score,
            mouth_score,
            instant,
            smoothed: self.window.mean(),
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}
