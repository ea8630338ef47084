//! Session report: the time-in-state summary handed to callers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::status::{ConcentrationLevel, WorkingStatus};

/// Seconds spent in one state and its share of the session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeShare {
    pub seconds: f64,
    pub percentage: f64,
}

impl TimeShare {
    /// Share of `total`; the percentage is 0 when `total` is 0.
    pub fn of(seconds: f64, total: f64) -> Self {
        let percentage = if total > 0.0 {
            seconds / total * 100.0
        } else {
            0.0
        };
        Self {
            seconds,
            percentage,
        }
    }
}

/// Immutable snapshot of a session's accumulated time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Total analyzed time (sum of the level tallies), in seconds.
    pub total_time_secs: f64,

    /// Number of frames that contributed to the tallies.
    pub frames_analyzed: u64,

    pub concentration_levels: BTreeMap<ConcentrationLevel, TimeShare>,

    pub working_status: BTreeMap<WorkingStatus, TimeShare>,
}

impl SessionReport {
    /// A report with every state at zero.
    pub fn empty() -> Self {
        Self {
            total_time_secs: 0.0,
            frames_analyzed: 0,
            concentration_levels: ConcentrationLevel::ALL
                .iter()
                .map(|level| (*level, TimeShare::default()))
                .collect(),
            working_status: WorkingStatus::ALL
                .iter()
                .map(|status| (*status, TimeShare::default()))
                .collect(),
        }
    }

    /// True when no frame contributed to this report.
    pub fn is_empty(&self) -> bool {
        self.frames_analyzed == 0
    }

    pub fn level(&self, level: ConcentrationLevel) -> TimeShare {
        self.concentration_levels
            .get(&level)
            .copied()
            .unwrap_or_default()
    }

    pub fn status(&self, status: WorkingStatus) -> TimeShare {
        self.working_status.get(&status).copied().unwrap_or_default()
    }

    /// Human-readable breakdown.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total Time: {:.2} seconds", self.total_time_secs);

        let _ = writeln!(out, "\nConcentration Breakdown:");
        for level in ConcentrationLevel::ALL {
            let share = self.level(level);
            let _ = writeln!(
                out,
                "{}: {:.2}s ({:.1}%)",
                level.label(),
                share.seconds,
                share.percentage
            );
        }

        let _ = writeln!(out, "\nWorking Status Breakdown:");
        for status in WorkingStatus::ALL {
            let share = self.status(status);
            let _ = writeln!(
                out,
                "{}: {:.2}s ({:.1}%)",
                status.label(),
                share.seconds,
                share.percentage
            );
        }
        out
    }
}

impl Default for SessionReport {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_share_zero_total() {
        let share = TimeShare::of(0.0, 0.0);
        assert_eq!(share.percentage, 0.0);
        assert!((TimeShare::of(5.0, 20.0).percentage - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_report_has_every_state() {
        let report = SessionReport::empty();
        assert!(report.is_empty());
        assert_eq!(report.concentration_levels.len(), 3);
        assert_eq!(report.working_status.len(), 2);
        assert_eq!(report.level(ConcentrationLevel::Deep).seconds, 0.0);
    }

    #[test]
    fn test_report_json_uses_labels() {
        let json = serde_json::to_string(&SessionReport::empty()).unwrap();
        assert!(json.contains("\"Deep\""));
        assert!(json.contains("\"Not Working\""));
        let parsed: SessionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, SessionReport::empty());
    }

    #[test]
    fn test_render_text() {
        let mut report = SessionReport::empty();
        report.total_time_secs = 20.0;
        report.frames_analyzed = 20;
        report
            .concentration_levels
            .insert(ConcentrationLevel::Deep, TimeShare::of(5.0, 20.0));

        let text = report.render_text();
        assert!(text.contains("Total Time: 20.00 seconds"));
        assert!(text.contains("Deep: 5.00s (25.0%)"));
        assert!(text.contains("Not Working: 0.00s (0.0%)"));
    }
}
