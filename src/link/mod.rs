//! Command link to the actuator board
//!
//! The board listens on a serial port for newline-terminated ASCII verbs.
//! Nothing is read back. The port is often missing (board unplugged), which
//! is a normal way to run: the link then swallows every message.

use crate::error::{Result, ScanError};
use log::{debug, info, warn};
use std::io::Write;
use std::time::Duration;

/// Fixed vocabulary understood by the actuator firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkMessage {
    Start,
    SpeedHigh,
    SpeedMedium,
    SpeedLow,
    NextSong,
    Qr,
}

impl LinkMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMessage::Start => "start",
            LinkMessage::SpeedHigh => "speed_high",
            LinkMessage::SpeedMedium => "speed_medium",
            LinkMessage::SpeedLow => "speed_low",
            LinkMessage::NextSong => "next_song",
            LinkMessage::Qr => "qr",
        }
    }

    /// Wire form: the verb followed by a newline
    pub fn to_line(&self) -> String {
        format!("{}\n", self.as_str())
    }
}

impl std::fmt::Display for LinkMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serial parameters for opening the link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    pub port: String,
    pub baud: u32,
    pub timeout: Duration,
    /// Wait after opening before the first write
    pub settle: Duration,
}

/// Best-effort channel to the actuator, either open or unavailable
pub enum CommandLink {
    Open {
        port: String,
        writer: Box<dyn Write + Send>,
    },
    Unavailable { port: String, reason: String },
}

impl CommandLink {
    /// Open the serial port, degrading to `Unavailable` on any failure.
    pub fn open(settings: &LinkSettings) -> Self {
        let opened = serialport::new(settings.port.as_str(), settings.baud)
            .timeout(settings.timeout)
            .open();

        match opened {
            Ok(port) => {
                info!(
                    "Command link open on {} at {} baud",
                    settings.port, settings.baud
                );
                if !settings.settle.is_zero() {
                    std::thread::sleep(settings.settle);
                }
                Self::from_writer(settings.port.clone(), port)
            }
            Err(e) => Self::unavailable(settings.port.clone(), e.to_string()),
        }
    }

    /// Wrap an already open byte sink
    pub fn from_writer(port: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        CommandLink::Open {
            port: port.into(),
            writer: Box::new(writer),
        }
    }

    /// A link with no port behind it; the only place unavailability is reported.
    pub fn unavailable(port: impl Into<String>, reason: impl Into<String>) -> Self {
        let (port, reason) = (port.into(), reason.into());
        let err = ScanError::LinkUnavailable {
            port: port.clone(),
            reason: reason.clone(),
        };
        warn!("{}; actuator commands will be dropped", err);
        CommandLink::Unavailable { port, reason }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, CommandLink::Open { .. })
    }

    pub fn port(&self) -> &str {
        match self {
            CommandLink::Open { port, .. } | CommandLink::Unavailable { port, .. } => port,
        }
    }

    /// Send one verb.
    ///
    /// On an unavailable link this is a no-op returning `Ok`.
    pub fn send(&mut self, message: LinkMessage) -> Result<()> {
        match self {
            CommandLink::Open { writer, .. } => {
                writer
                    .write_all(message.to_line().as_bytes())
                    .and_then(|_| writer.flush())
                    .map_err(|source| ScanError::LinkWrite { message, source })?;
                debug!("Sent to actuator: {}", message);
                Ok(())
            }
            CommandLink::Unavailable { port, .. } => {
                debug!("Dropped `{}`: command link {} unavailable", message, port);
                Ok(())
            }
        }
    }

    /// Flush and release the port; later sends become no-ops.
    pub fn close(&mut self) {
        if let CommandLink::Open { port, writer } = self {
            if let Err(e) = writer.flush() {
                warn!("Flushing command link {} on close failed: {}", port, e);
            }
            info!("Command link {} closed", port);
            let port = port.clone();
            *self = CommandLink::Unavailable {
                port,
                reason: "closed".to_string(),
            };
        }
    }
}

impl std::fmt::Debug for CommandLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandLink::Open { port, .. } => f.debug_struct("Open").field("port", port).finish(),
            CommandLink::Unavailable { port, reason, .. } => f
                .debug_struct("Unavailable")
                .field("port", port)
                .field("reason", reason)
                .finish(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory port that records writes and can be made to fail
    #[derive(Clone, Default)]
    pub(crate) struct FakePort {
        pub written: Arc<Mutex<Vec<u8>>>,
        pub broken: Arc<Mutex<bool>>,
    }

    impl FakePort {
        pub fn lines(&self) -> Vec<String> {
            String::from_utf8(self.written.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        pub fn set_broken(&self, broken: bool) {
            *self.broken.lock().unwrap() = broken;
        }
    }

    impl Write for FakePort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if *self.broken.lock().unwrap() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
            }
            self.written.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_wire_format() {
        let port = FakePort::default();
        let mut link = CommandLink::from_writer("fake", port.clone());

        for message in [
            LinkMessage::Start,
            LinkMessage::SpeedHigh,
            LinkMessage::SpeedMedium,
            LinkMessage::SpeedLow,
            LinkMessage::NextSong,
            LinkMessage::Qr,
        ] {
            link.send(message).unwrap();
        }

        assert_eq!(
            String::from_utf8(port.written.lock().unwrap().clone()).unwrap(),
            "start\nspeed_high\nspeed_medium\nspeed_low\nnext_song\nqr\n"
        );
    }

    #[test]
    fn test_unavailable_link_swallows_messages() {
        let mut link = CommandLink::unavailable("/dev/ttyUSB0", "No such file or directory");
        let before = format!("{:?}", link);

        assert!(!link.is_open());
        assert!(link.send(LinkMessage::Qr).is_ok());
        assert!(link.send(LinkMessage::Start).is_ok());

        // sends are silent no-ops: nothing about the link changes
        assert_eq!(format!("{:?}", link), before);
        assert_eq!(link.port(), "/dev/ttyUSB0");
    }

    #[test]
    fn test_write_failure_is_transient() {
        let port = FakePort::default();
        let mut link = CommandLink::from_writer("fake", port.clone());

        port.set_broken(true);
        let err = link.send(LinkMessage::Qr).unwrap_err();
        assert!(matches!(
            err,
            ScanError::LinkWrite {
                message: LinkMessage::Qr,
                ..
            }
        ));
        assert!(link.is_open());

        port.set_broken(false);
        link.send(LinkMessage::NextSong).unwrap();
        assert_eq!(port.lines(), vec!["next_song"]);
    }

    #[test]
    fn test_missing_port_opens_unavailable() {
        let link = CommandLink::open(&LinkSettings {
            port: "/dev/wardscan-no-such-port".to_string(),
            baud: 9600,
            timeout: Duration::from_millis(100),
            settle: Duration::ZERO,
        });
        assert!(!link.is_open());
        assert_eq!(link.port(), "/dev/wardscan-no-such-port");
    }

    #[test]
    fn test_close_is_idempotent() {
        let port = FakePort::default();
        let mut link = CommandLink::from_writer("fake", port.clone());

        link.close();
        link.close();
        assert!(!link.is_open());
        assert!(link.send(LinkMessage::Qr).is_ok());
        assert!(port.lines().is_empty());
    }
}
