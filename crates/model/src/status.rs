//! Per-frame classifications.

use serde::{Deserialize, Serialize};

use crate::frame::TimestampNs;

/// Whether the subject is facing the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkingStatus {
    #[serde(rename = "Working")]
    Working,
    #[serde(rename = "Not Working")]
    NotWorking,
}

impl WorkingStatus {
    pub const ALL: [WorkingStatus; 2] = [WorkingStatus::Working, WorkingStatus::NotWorking];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Working => "Working",
            Self::NotWorking => "Not Working",
        }
    }
}

/// Graded concentration, ordered by intensity (`Low < Moderate < Deep`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConcentrationLevel {
    Low,
    Moderate,
    Deep,
}

impl ConcentrationLevel {
    /// Report order: most intense first.
    pub const ALL: [ConcentrationLevel; 3] = [
        ConcentrationLevel::Deep,
        ConcentrationLevel::Moderate,
        ConcentrationLevel::Low,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Deep => "Deep",
        }
    }
}

impl std::fmt::Display for WorkingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::fmt::Display for ConcentrationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Live output for one analyzed frame, for real-time display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReading {
    /// Timestamp of the frame this reading was derived from.
    pub timestamp_ns: TimestampNs,
    pub status: WorkingStatus,
    pub level: ConcentrationLevel,
    /// Composite score in `[0, 1]`; 0 for frames without a face.
    pub composite: f64,
    /// Fraction of the deep dwell already sustained, while a run is active.
    pub deep_progress: Option<f64>,
}
