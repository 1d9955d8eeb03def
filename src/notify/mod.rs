//! Notifier channels
//!
//! Each channel turns a scan event or operator command into one side effect:
//! a sound, a status line, a mark on the video overlay. Channels may fail;
//! the dispatcher logs the failure and moves on to the next channel.

pub mod audio;
pub mod overlay;
pub mod status;

pub use audio::BellCue;
#[cfg(feature = "tone")]
pub use audio::ToneCue;
pub use overlay::{MarkLayer, OverlayMark};
pub use status::TerminalStatus;

use crate::pipeline::types::Geometry;
use crate::scan::Record;
use anyhow::Result;

/// Severity of a status line, mapped to a color by the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One status line shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub level: StatusLevel,
}

impl Status {
    pub fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Short audible confirmation of a fresh scan
pub trait AudioCue {
    fn play(&mut self) -> Result<()>;
}

/// Status line plus the details panel of the last recognized record
pub trait StatusDisplay {
    fn set_status(&mut self, status: &Status) -> Result<()>;

    fn show_record(&mut self, record: &Record) -> Result<()>;
}

/// Annotations drawn on top of the current frame
pub trait Overlay {
    fn mark(&mut self, text: &str, geometry: &Geometry) -> Result<()>;

    /// Marks collected since the last `clear`
    fn marks(&self) -> &[OverlayMark];

    fn clear(&mut self);
}
