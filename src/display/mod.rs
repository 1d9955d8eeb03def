//! Presentation of the live view
//!
//! Drawing the video itself is left to the renderer implementation; the
//! loop only hands it the current frame and the overlay marks.

use crate::capture::Frame;
use crate::notify::Overlay;
use anyhow::Result;
use log::{debug, info};

/// Draws frames with their overlay and keeps the operator surface alive
pub trait Renderer {
    fn render(&mut self, frame: &Frame, overlay: &dyn Overlay) -> Result<()>;

    /// Pump the operator control surface once per cycle
    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    /// Close windows and free display resources
    fn release(&mut self) {}
}

/// Renderer for headless runs: overlay marks go to the log
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &Frame, overlay: &dyn Overlay) -> Result<()> {
        self.frames += 1;
        for mark in overlay.marks() {
            info!("Frame {}: {} [{}]", frame.seq, mark.label, mark.geometry);
        }
        Ok(())
    }

    fn release(&mut self) {
        debug!("Renderer released after {} frames", self.frames);
    }
}
