//! Counters for the control loop

/// Per-run scan statistics
///
/// Only the loop thread touches these, so they are plain counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Frames pulled from the source
    pub frames: u64,

    /// Frames in which nothing was decoded
    pub empty_frames: u64,

    /// Observations handed to the debouncer
    pub observations: u64,

    pub new_events: u64,
    pub repeated: u64,
    pub suppressed: u64,

    /// New events whose code had no record
    pub unknown_codes: u64,

    pub operator_commands: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of observations that were repeats or noise, in percent
    pub fn duplicate_rate(&self) -> f64 {
        if self.observations == 0 {
            return 0.0;
        }
        ((self.repeated + self.suppressed) as f64 / self.observations as f64) * 100.0
    }
}

impl std::fmt::Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scans: {} frames ({} empty), {} observations, {} new ({} unknown), {} repeated, {} suppressed ({:.1}% duplicates), {} operator commands",
            self.frames,
            self.empty_frames,
            self.observations,
            self.new_events,
            self.unknown_codes,
            self.repeated,
            self.suppressed,
            self.duplicate_rate(),
            self.operator_commands
        )
    }
}
