//! Traits for frame acquisition and code detection

use super::Frame;
use crate::error::Result;
use crate::pipeline::types::ScanObservation;

/// Trait for frame sources (camera, replay file, ...)
pub trait FrameSource {
    /// Block until the next frame is available.
    ///
    /// An error is fatal: the control loop shuts down.
    fn next_frame(&mut self) -> Result<Frame>;

    /// Release the device; called once during shutdown.
    fn release(&mut self) {}

    /// Get the resolution of the frames in (width, height)
    fn resolution(&self) -> (u32, u32);
}

/// Trait for optical code detectors
pub trait CodeDetector {
    /// Decode every code visible in `frame`, in detection order.
    fn detect(&mut self, frame: &Frame) -> Vec<ScanObservation>;
}
