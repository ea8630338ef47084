//! Deviation of the face anchor from the calibrated baseline.

use attentive_common::config::PositionConfig;
use attentive_model::Point3D;

use crate::window::{SlidingWindow, NEUTRAL};

#[derive(Debug, Clone)]
pub struct PositionAnalyzer {
    config: PositionConfig,
    window: SlidingWindow<f64>,
}

impl PositionAnalyzer {
    pub fn new(config: PositionConfig, capacity: usize) -> Self {
        Self {
            config,
            window: SlidingWindow::new(capacity),
        }
    }

    /// Smoothed position score for `anchor`.
    ///
    /// Without a baseline nothing is recorded and [`NEUTRAL`] is returned.
    pub fn update(&mut self, anchor: Point3D, baseline: Option<Point3D>) -> f64 {
        let Some(baseline) = baseline else {
            return NEUTRAL;
        };
        let deviation = anchor.distance_3d(&baseline);
        let score = (1.0 - deviation * self.config.sensitivity_gain).max(0.0);
        self.window.push(score);
        self.window.mean()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}
