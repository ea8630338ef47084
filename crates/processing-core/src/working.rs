//! Facing-the-camera classifier.
//!
//! When the head turns, the two lateral anchors converge horizontally.
//! Below the configured separation the subject is NOT_WORKING. A frame
//! without a face is NOT_WORKING too: that is the fail-safe default.

use attentive_common::config::WorkingStatusConfig;
use attentive_model::{FaceGeometry, WorkingStatus};

#[derive(Debug, Clone, Copy)]
pub struct WorkingStatusClassifier {
    config: WorkingStatusConfig,
}

impl WorkingStatusClassifier {
    pub fn new(config: WorkingStatusConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, face: Option<&FaceGeometry>) -> WorkingStatus {
        let Some(face) = face else {
            return WorkingStatus::NotWorking;
        };
        let separation = (face.left_lateral.x - face.right_lateral.x).abs();
        if separation < self.config.min_lateral_separation {
            WorkingStatus::NotWorking
        } else {
            WorkingStatus::Working
        }
    }
}
