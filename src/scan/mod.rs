//! Scan classification: debouncing observations and resolving them to records

pub mod debounce;
pub mod records;

pub use debounce::{Classification, DebounceState, Debouncer};
pub use records::{Record, RecordDirectory};

use crate::pipeline::types::{Geometry, Timestamp};

/// A classified observation, consumed immediately by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEvent {
    pub code: String,
    pub record: Option<Record>,
    pub classification: Classification,
    pub geometry: Geometry,
    pub at: Timestamp,
}
