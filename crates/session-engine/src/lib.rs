//! Attentive Session Engine
//!
//! Runs a concentration detector on a background worker for the length of
//! a monitoring session. The worker exclusively owns the detector and the
//! landmark source; the caller keeps a stop flag and a live reading feed.
//!
//! # Architecture
//!
//! ```text
//!  caller                         blocking worker
//!  ──────                         ───────────────
//!  MonitorSession::start ──────▶  LandmarkSource
//!                                      │
//!  stop flag (AtomicBool) ──────▶  FrameGate
//!                                      │
//!  watch<FrameReading>   ◀──────  ConcentrationDetector
//!                                      │
//!  stop() / wait()       ◀──────  SessionReport
//!  ReleaseHandle         ──────▶  (forced release on stop timeout)
//! ```

pub mod session;
pub mod source;
pub mod writer;

pub use session::*;
pub use source::{JsonlFrameSource, LandmarkSource, ReleaseHandle, ReplaySource};
pub use writer::FrameWriter;
