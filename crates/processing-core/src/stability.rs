//! Status stability: how rarely the working status flips.

use attentive_model::WorkingStatus;

use crate::window::{SlidingWindow, NEUTRAL};

#[derive(Debug, Clone)]
pub struct StabilityAnalyzer {
    history: SlidingWindow<WorkingStatus>,
}

impl StabilityAnalyzer {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: SlidingWindow::new(capacity),
        }
    }

    pub fn record(&mut self, status: WorkingStatus) {
        self.history.push(status);
    }

    /// `1 - flips / (len - 1)`, or [`NEUTRAL`] with fewer than two entries.
    pub fn score(&self) -> f64 {
        if self.history.len() < 2 {
            return NEUTRAL;
        }
        1.0 - self.history.transition_rate()
    }

    pub fn history(&self) -> &SlidingWindow<WorkingStatus> {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkingStatus::{NotWorking, Working};

    #[test]
    fn test_short_history_is_neutral() {
        let mut analyzer = StabilityAnalyzer::new(90);
        assert_eq!(analyzer.score(), NEUTRAL);
        analyzer.record(Working);
        assert_eq!(analyzer.score(), NEUTRAL);
    }

    #[test]
    fn test_constant_status_is_fully_stable() {
        let mut analyzer = StabilityAnalyzer::new(90);
        for _ in 0..10 {
            analyzer.record(NotWorking);
        }
        assert_eq!(analyzer.score(), 1.0);
    }

    #[test]
    fn test_alternating_status_is_unstable() {
        let mut analyzer = StabilityAnalyzer::new(90);
        for i in 0..10 {
            analyzer.record(if i % 2 == 0 { Working } else { NotWorking });
        }
        assert_eq!(analyzer.score(), 0.0);
    }

    #[test]
    fn test_partial_flips() {
        let mut analyzer = StabilityAnalyzer::new(5);
        for status in [Working, Working, NotWorking, NotWorking, Working] {
            analyzer.record(status);
        }
        // 2 flips over 4 pairs
        assert!((analyzer.score() - 0.5).abs() < 1e-12);
    }
}
