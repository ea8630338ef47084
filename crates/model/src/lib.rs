//! Attentive Model
//!
//! Defines the data contracts shared by the concentration pipeline:
//! - **Frames:** Timestamped landmark sets, or an explicit "no face" marker
//! - **Layout:** Which landmark indices the pipeline reads
//! - **Status:** Working status, concentration level, live per-frame readings
//! - **Report:** Time-in-state summary handed to persistence collaborators
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the image,
//! with depth in the landmark producer's own units.

pub mod frame;
pub mod layout;
pub mod point;
pub mod report;
pub mod status;
pub mod synthetic;

pub use frame::*;
pub use layout::*;
pub use point::*;
pub use report::*;
pub use status::*;
