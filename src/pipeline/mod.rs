//! Scan pipeline
//!
//! This module drives the per-frame work of the scanner:
//! - Control: the loop that pulls frames and feeds the debouncer/dispatcher
//! - Timing: injectable monotonic clocks
//! - State: the Running / ShuttingDown / Stopped lifecycle
//! - Health: counters logged while running and at shutdown

pub mod clock;
pub mod control;
pub mod health;
pub mod state;
pub mod types;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use control::{ControlLoop, LoopParts};
pub use health::ScanStats;
pub use state::LoopState;
pub use types::{Geometry, ScanObservation, Timestamp};
