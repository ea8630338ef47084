//! Eye-aspect-ratio and blink-rate scoring.
//!
//! `EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)` in the image plane. Open eyes
//! sit around 0.25–0.35; a closed eye collapses toward 0.
//!
//! Blink frames are counted over a long window (≈6s) and converted to a
//! per-minute rate. The score peaks at a natural target rate and falls off
//! linearly over a deliberately wide tolerance so that a noisy blink
//! signal cannot dominate the composite.

use attentive_common::config::BlinkConfig;
use attentive_model::{FaceGeometry, Point3D};

use crate::window::{SlidingWindow, NEUTRAL};

/// Eye-aspect-ratio of six ordered eye landmarks.
///
/// Returns `None` when the eye corners coincide (degenerate geometry).
pub fn eye_aspect_ratio(eye: &[Point3D; 6]) -> Option<f64> {
    let horizontal = eye[0].distance_2d(&eye[3]);
    if horizontal < 1e-9 {
        return None;
    }
    let vertical = eye[1].distance_2d(&eye[5]) + eye[2].distance_2d(&eye[4]);
    Some(vertical / (2.0 * horizontal))
}

/// Score of an observed blink rate: 1.0 at `target`, 0.0 at `tolerance` away.
pub fn blink_score(rate_per_min: f64, target: f64, tolerance: f64) -> f64 {
    (1.0 - (rate_per_min - target).abs() / tolerance).max(0.0)
}

/// Output of one blink analysis step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkReading {
    /// Average EAR of both eyes, when measurable.
    pub ear: Option<f64>,
    pub blink_frame: bool,
    pub rate_per_min: f64,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct BlinkAnalyzer {
    config: BlinkConfig,
    window: SlidingWindow<bool>,
    frame_secs: f64,
}

impl BlinkAnalyzer {
    /// `frame_secs` is the time each analyzed frame represents.
    pub fn new(config: BlinkConfig, capacity: usize, frame_secs: f64) -> Self {
        Self {
            config,
            window: SlidingWindow::new(capacity),
            frame_secs,
        }
    }

    pub fn update(&mut self, face: &FaceGeometry) -> BlinkReading {
        let ear = match (
            eye_aspect_ratio(&face.left_eye),
            eye_aspect_ratio(&face.right_eye),
        ) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(one), None) | (None, Some(one)) => Some(one),
            (None, None) => None,
        };

        // Unmeasurable eyes are recorded as open.
        let blink_frame = ear.is_some_and(|ear| ear < self.config.ear_threshold);
        self.window.push(blink_frame);

        let rate_per_min = self.rate_per_min();
        let score = if self.window.len() < 2 {
            NEUTRAL
        } else {
            blink_score(
                rate_per_min,
                self.config.target_rate_per_min,
                self.config.tolerance,
            )
        };

        BlinkReading {
            ear,
            blink_frame,
            rate_per_min,
            score,
        }
    }

    /// Blink frames per minute over the window's time span.
    pub fn rate_per_min(&self) -> f64 {
        let span_secs = self.window.len() as f64 * self.frame_secs;
        if span_secs <= 0.0 {
            return 0.0;
        }
        self.window.count_true() as f64 * 60.0 / span_secs
    }

    pub fn window(&self) -> &SlidingWindow<bool> {
        &self.window
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}
