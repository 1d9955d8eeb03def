use super::{Status, StatusDisplay, StatusLevel};
use crate::scan::Record;
use anyhow::Result;
use chrono::Local;
use std::io::{self, Write};

/// Status panel rendered as timestamped terminal lines
///
/// The loop refreshes the status every frame; only changes are printed.
pub struct TerminalStatus<W: Write = io::Stdout> {
    out: W,
    color: bool,
    current: Option<Status>,
}

impl TerminalStatus<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write> TerminalStatus<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Status> {
        self.current.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, level: StatusLevel, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match level {
            StatusLevel::Info => "34",
            StatusLevel::Success => "32",
            StatusLevel::Warning => "33",
            StatusLevel::Error => "31",
        };
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

impl<W: Write> StatusDisplay for TerminalStatus<W> {
    fn set_status(&mut self, status: &Status) -> Result<()> {
        if self.current.as_ref() == Some(status) {
            return Ok(());
        }
        let line = self.paint(status.level, &status.text);
        writeln!(self.out, "[{}] {}", Local::now().format("%H:%M:%S"), line)?;
        self.out.flush()?;
        self.current = Some(status.clone());
        Ok(())
    }

    fn show_record(&mut self, record: &Record) -> Result<()> {
        writeln!(
            self.out,
            "    Name: {}\n    Room: {}\n    Procedure: {}",
            record.name, record.location, record.procedure
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_changes_are_printed() {
        let mut display = TerminalStatus::new(Vec::new(), false);
        let idle = Status::new("No code detected", StatusLevel::Info);

        display.set_status(&idle).unwrap();
        display.set_status(&idle).unwrap();
        display
            .set_status(&Status::new("Unrecognized code", StatusLevel::Error))
            .unwrap();
        display.set_status(&idle).unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("] No code detected"));
        assert!(lines[1].ends_with("] Unrecognized code"));
    }

    #[test]
    fn test_record_panel() {
        let mut display = TerminalStatus::new(Vec::new(), false);
        display
            .show_record(&Record {
                id: "Patient 3".into(),
                name: "Patient C".into(),
                location: "103".into(),
                procedure: "Endoscopy".into(),
            })
            .unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert!(out.contains("Name: Patient C"));
        assert!(out.contains("Room: 103"));
        assert!(out.contains("Procedure: Endoscopy"));
    }

    #[test]
    fn test_color_codes_follow_level() {
        let mut display = TerminalStatus::new(Vec::new(), true);
        display
            .set_status(&Status::new("Code scanned successfully", StatusLevel::Success))
            .unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert!(out.contains("\x1b[32mCode scanned successfully\x1b[0m"));
    }
}
