use super::{CodeDetector, Frame, FrameSource};
use crate::error::Result;
use crate::pipeline::clock::Clock;
use crate::pipeline::types::ScanObservation;
use log::info;

/// Detector for sources that carry no codes
#[derive(Debug, Default)]
pub struct NullDetector;

impl CodeDetector for NullDetector {
    fn detect(&mut self, _frame: &Frame) -> Vec<ScanObservation> {
        Vec::new()
    }
}

/// Endless empty frames, for running the operator console and the actuator
/// link without a camera backend.
pub struct BlankSource<C: Clock> {
    clock: C,
    width: u32,
    height: u32,
    seq: u64,
}

impl<C: Clock> BlankSource<C> {
    pub fn new(clock: C, width: u32, height: u32) -> Self {
        Self {
            clock,
            width,
            height,
            seq: 0,
        }
    }
}

impl<C: Clock> FrameSource for BlankSource<C> {
    fn next_frame(&mut self) -> Result<Frame> {
        let frame = Frame::blank(self.seq, self.clock.now(), self.width, self.height);
        self.seq += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        info!("Blank source released after {} frames", self.seq);
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
