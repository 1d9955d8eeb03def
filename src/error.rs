//! Error handling for the scanner

use crate::link::LinkMessage;

/// Result type alias
pub type Result<T> = std::result::Result<T, ScanError>;

/// Error types
///
/// Unknown codes are not represented here: an unrecognized code is a normal
/// resolution outcome.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The frame source could not deliver a frame; ends the control loop
    #[error("Frame acquisition failed: {0}")]
    FrameAcquisition(String),

    /// The actuator port could not be opened
    #[error("Command link unavailable on {port}: {reason}")]
    LinkUnavailable { port: String, reason: String },

    /// A write to an open actuator port failed
    #[error("Failed to send `{message}` over command link: {source}")]
    LinkWrite {
        message: LinkMessage,
        #[source]
        source: std::io::Error,
    },

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// Record directory error
    #[error("Record directory error: {0}")]
    Records(String),

    /// Replay script error
    #[error("Replay error: {0}")]
    Replay(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let unavailable = ScanError::LinkUnavailable {
            port: "/dev/ttyUSB0".into(),
            reason: "not attached".into(),
        };
        assert_eq!(
            unavailable.to_string(),
            "Command link unavailable on /dev/ttyUSB0: not attached"
        );

        let write = ScanError::LinkWrite {
            message: LinkMessage::Qr,
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"),
        };
        assert!(std::error::Error::source(&write).is_some());
        assert_eq!(
            write.to_string(),
            "Failed to send `qr` over command link: unplugged"
        );
    }
}
