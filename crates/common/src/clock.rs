//! Clock and frame-timing utilities.
//!
//! Every landmark frame is stamped against a monotonic epoch recorded when
//! the session starts. This module provides:
//! - The session clock (monotonic epoch plus wall-clock start)
//! - Nanosecond to second conversion
//! - Frame gating for callers that only analyze every n-th frame

use std::time::Instant;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment monitoring started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant monitoring started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

/// Frame-skip controller.
///
/// Admits one frame out of every `skip`. The first frame is always
/// admitted so a session never starts with a blank reading.
#[derive(Debug, Clone)]
pub struct FrameGate {
    skip: u32,
    seen: u64,
}

impl FrameGate {
    /// Create a gate admitting every `skip`-th frame (0 is treated as 1).
    pub fn new(skip: u32) -> Self {
        Self {
            skip: skip.max(1),
            seen: 0,
        }
    }

    /// Register an incoming frame and report whether it should be analyzed.
    pub fn admit(&mut self) -> bool {
        let admitted = self.seen % self.skip as u64 == 0;
        self.seen += 1;
        admitted
    }

    /// Frames offered to the gate so far.
    pub fn frames_seen(&self) -> u64 {
        self.seen
    }

    /// Skip factor.
    pub fn skip(&self) -> u32 {
        self.skip
    }
}
