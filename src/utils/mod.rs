pub mod sos;

/// Seconds as a `Duration`, rejecting negative, NaN and infinite values
pub fn secs_to_duration(secs: f64) -> Option<std::time::Duration> {
    std::time::Duration::try_from_secs_f64(secs).ok()
}
