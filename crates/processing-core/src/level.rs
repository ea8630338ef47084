//! Concentration level state machine.
//!
//! Evaluated once per analyzed frame:
//!
//! - composite `<=` threshold: LOW, and the run timer stops.
//! - composite `>` threshold: the run timer starts (if idle); once it has
//!   run for `deep_dwell_secs` the level is DEEP, otherwise MODERATE.
//!
//! Any dip to or below the threshold discards the whole run. There is no
//! partial credit and no decay. Time is measured with frame timestamps.

use attentive_common::clock::SessionClock;
use attentive_common::config::LevelConfig;
use attentive_model::{ConcentrationLevel, TimestampNs};

/// Continuous above-threshold run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConcentrationTimer {
    started_at_ns: Option<TimestampNs>,
    elapsed_secs: f64,
}

impl ConcentrationTimer {
    pub fn is_running(&self) -> bool {
        self.started_at_ns.is_some()
    }

    pub fn started_at_ns(&self) -> Option<TimestampNs> {
        self.started_at_ns
    }

    /// Length of the current run as of the last update.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Start the run if idle, otherwise refresh the elapsed time.
    fn tick(&mut self, now_ns: TimestampNs) -> f64 {
        match self.started_at_ns {
            None => {
                self.started_at_ns = Some(now_ns);
                self.elapsed_secs = 0.0;
            }
            Some(start) => {
                self.elapsed_secs = SessionClock::ns_to_secs(now_ns.saturating_sub(start));
            }
        }
        self.elapsed_secs
    }

    fn stop(&mut self) {
        self.started_at_ns = None;
        self.elapsed_secs = 0.0;
    }
}

#[derive(Debug, Clone)]
pub struct LevelStateMachine {
    config: LevelConfig,
    timer: ConcentrationTimer,
    level: ConcentrationLevel,
}

impl LevelStateMachine {
    /// Starts at LOW with no active run.
    pub fn new(config: LevelConfig) -> Self {
        Self {
            config,
            timer: ConcentrationTimer::default(),
            level: ConcentrationLevel::Low,
        }
    }

    /// Feed one composite score observed at `now_ns`.
    pub fn update(&mut self, composite: f64, now_ns: TimestampNs) -> ConcentrationLevel {
        let next = if composite > self.config.promotion_threshold {
            let elapsed = self.timer.tick(now_ns);
            if elapsed >= self.config.deep_dwell_secs {
                ConcentrationLevel::Deep
            } else {
                ConcentrationLevel::Moderate
            }
        } else {
            self.timer.stop();
            ConcentrationLevel::Low
        };
        self.transition(next, composite);
        next
    }

    /// Force LOW and drop any active run (used for frames without a face).
    pub fn drop_run(&mut self) -> ConcentrationLevel {
        self.timer.stop();
        self.transition(ConcentrationLevel::Low, 0.0);
        ConcentrationLevel::Low
    }

    pub fn level(&self) -> ConcentrationLevel {
        self.level
    }

    pub fn timer(&self) -> &ConcentrationTimer {
        &self.timer
    }

    /// Fraction of the dwell sustained so far, while a run is active.
    pub fn deep_progress(&self) -> Option<f64> {
        if !self.timer.is_running() {
            return None;
        }
        if self.config.deep_dwell_secs <= 0.0 {
            return Some(1.0);
        }
        Some((self.timer.elapsed_secs() / self.config.deep_dwell_secs).min(1.0))
    }

    pub fn reset(&mut self) {
        self.timer.stop();
        self.level = ConcentrationLevel::Low;
    }

    fn transition(&mut self, next: ConcentrationLevel, composite: f64) {
        if next == self.level {
            return;
        }
        if next == ConcentrationLevel::Deep {
            tracing::info!(
                dwell_secs = self.timer.elapsed_secs(),
                composite,
                "Deep concentration reached"
            );
        } else {
            tracing::debug!(from = %self.level, to = %next, composite, "Concentration level changed");
        }
        self.level = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConcentrationLevel::{Deep, Low, Moderate};

    const SEC: u64 = 1_000_000_000;

    fn machine(threshold: f64, dwell: f64) -> LevelStateMachine {
        LevelStateMachine::new(LevelConfig {
            promotion_threshold: threshold,
            deep_dwell_secs: dwell,
        })
    }

    #[test]
    fn test_initial_state() {
        let machine = machine(0.6, 15.0);
        assert_eq!(machine.level(), Low);
        assert!(!machine.timer().is_running());
        assert_eq!(machine.deep_progress(), None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut machine = machine(0.6, 15.0);
        assert_eq!(machine.update(0.6, 0), Low);
        assert!(!machine.timer().is_running());
        assert_eq!(machine.update(0.6001, SEC), Moderate);
        assert!(machine.timer().is_running());
    }

    #[test]
    fn test_sustained_run_reaches_deep() {
        let mut machine = machine(0.6, 15.0);
        let levels: Vec<_> = (0..20).map(|s| machine.update(0.8, s * SEC)).collect();
        assert!(levels[..15].iter().all(|l| *l == Moderate));
        assert!(levels[15..].iter().all(|l| *l == Deep));
    }

    #[test]
    fn test_dip_restarts_dwell_clock() {
        let mut machine = machine(0.6, 15.0);
        // 14 seconds above threshold: one short of the dwell.
        for s in 0..=14 {
            assert_eq!(machine.update(0.8, s * SEC), Moderate);
        }
        assert_eq!(machine.update(0.3, 15 * SEC), Low);
        assert!(!machine.timer().is_running());

        // The stale run must not count: the clock restarts at 16s.
        for s in 16..31 {
            assert_eq!(machine.update(0.8, s * SEC), Moderate, "second {s}");
        }
        assert_eq!(machine.timer().started_at_ns(), Some(16 * SEC));
        assert_eq!(machine.update(0.8, 31 * SEC), Deep);
    }

    #[test]
    fn test_deep_drops_to_low_on_dip() {
        let mut machine = machine(0.6, 2.0);
        for s in 0..=2 {
            machine.update(0.9, s * SEC);
        }
        assert_eq!(machine.level(), Deep);
        assert_eq!(machine.update(0.1, 3 * SEC), Low);
        assert_eq!(machine.update(0.9, 4 * SEC), Moderate);
    }

    #[test]
    fn test_deep_progress() {
        let mut machine = machine(0.6, 10.0);
        machine.update(0.9, 0);
        machine.update(0.9, 5 * SEC);
        assert!((machine.deep_progress().unwrap() - 0.5).abs() < 1e-12);
        machine.update(0.9, 20 * SEC);
        assert_eq!(machine.deep_progress(), Some(1.0));
    }

    #[test]
    fn test_drop_run() {
        let mut machine = machine(0.6, 10.0);
        machine.update(0.9, 0);
        assert_eq!(machine.drop_run(), Low);
        assert!(!machine.timer().is_running());
    }

    #[test]
    fn test_zero_dwell_is_deep_immediately() {
        let mut machine = machine(0.6, 0.0);
        assert_eq!(machine.update(0.9, 0), Deep);
    }
}
