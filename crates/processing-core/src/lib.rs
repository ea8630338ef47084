//! Attentive Processing Core
//!
//! Turns noisy per-frame face geometry into stable attentiveness decisions:
//! - **Windows:** Bounded rolling history with fail-soft reductions
//! - **Analyzers:** Blink rate, expression, position, working status, stability
//! - **Aggregation:** Weighted composite score in `[0, 1]`
//! - **Levels:** Dwell-time hysteresis promoting MODERATE runs to DEEP
//! - **Tallies:** Time-in-state bookkeeping and session reports
//!
//! This crate is pure computation: no I/O, no threads, no wall clock.
//! Time comes from frame timestamps.

pub mod aggregate;
pub mod calibration;
pub mod detector;
pub mod expression;
pub mod eye;
pub mod level;
pub mod position;
pub mod stability;
pub mod tally;
pub mod window;
pub mod working;

pub use detector::{ConcentrationDetector, FrameAnalysis, FrameOutcome};
pub use window::SlidingWindow;
