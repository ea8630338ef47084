//! Time-in-state bookkeeping.

use std::collections::BTreeMap;

use attentive_model::{ConcentrationLevel, SessionReport, TimeShare, WorkingStatus};

/// Accumulated seconds per working status and per concentration level.
///
/// Tallies only ever grow; [`DurationTally::report`] takes a snapshot
/// without touching them.
#[derive(Debug, Clone, Default)]
pub struct DurationTally {
    by_status: BTreeMap<WorkingStatus, f64>,
    by_level: BTreeMap<ConcentrationLevel, f64>,
    frames: u64,
}

impl DurationTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `secs` to both the status and the level of one frame.
    pub fn record(&mut self, status: WorkingStatus, level: ConcentrationLevel, secs: f64) {
        let secs = secs.max(0.0);
        *self.by_status.entry(status).or_insert(0.0) += secs;
        *self.by_level.entry(level).or_insert(0.0) += secs;
        self.frames += 1;
    }

    pub fn status_secs(&self, status: WorkingStatus) -> f64 {
        self.by_status.get(&status).copied().unwrap_or(0.0)
    }

    pub fn level_secs(&self, level: ConcentrationLevel) -> f64 {
        self.by_level.get(&level).copied().unwrap_or(0.0)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Sum of the level tallies.
    pub fn total_secs(&self) -> f64 {
        ConcentrationLevel::ALL
            .iter()
            .map(|level| self.level_secs(*level))
            .sum()
    }

    pub fn report(&self) -> SessionReport {
        let total = self.total_secs();
        SessionReport {
            total_time_secs: total,
            frames_analyzed: self.frames,
            concentration_levels: ConcentrationLevel::ALL
                .iter()
                .map(|level| (*level, TimeShare::of(self.level_secs(*level), total)))
                .collect(),
            working_status: WorkingStatus::ALL
                .iter()
                .map(|status| (*status, TimeShare::of(self.status_secs(*status), total)))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
