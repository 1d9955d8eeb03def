//! Frame acquisition module
//!
//! The camera and the optical decoder sit behind `FrameSource` and
//! `CodeDetector`. This build ships a replay source that plays back a
//! scripted session, and a blank source used when no script is given.

pub mod blank;
pub mod replay;
mod traits;

pub use blank::{BlankSource, NullDetector};
pub use replay::{ReplayScript, ReplaySource, ScriptedDetector};
pub use traits::{CodeDetector, FrameSource};

use crate::pipeline::types::Timestamp;
use bytes::Bytes;

/// One captured frame
#[derive(Clone)]
pub struct Frame {
    /// Position in the capture sequence, starting at 0
    pub seq: u64,
    pub captured_at: Timestamp,
    pub width: u32,
    pub height: u32,
    /// Raw pixel data; empty for synthetic frames
    pub pixels: Bytes,
}

impl Frame {
    pub fn blank(seq: u64, captured_at: Timestamp, width: u32, height: u32) -> Self {
        Self {
            seq,
            captured_at,
            width,
            height,
            pixels: Bytes::new(),
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("seq", &self.seq)
            .field("captured_at", &self.captured_at)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.pixels.len())
            .finish()
    }
}
