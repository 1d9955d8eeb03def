//! Control loop
//!
//! One thread, one cycle per frame: acquire, detect, debounce, dispatch,
//! drain operator commands, render, check for quit. Resources are released
//! exactly once in a fixed order (frame source, display, command link) no
//! matter how the loop ends.

use super::clock::Clock;
use super::health::ScanStats;
use super::state::LoopState;
use crate::capture::{CodeDetector, FrameSource};
use crate::display::Renderer;
use crate::events::{EventDispatcher, OperatorCommand};
use crate::scan::{Classification, Debouncer, RecordDirectory, ScanEvent};
use crate::utils::sos::SignalOfStop;
use log::{error, info, warn};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// Everything the loop drives, handed over at construction
pub struct LoopParts {
    pub clock: Box<dyn Clock>,
    pub frames: Box<dyn FrameSource>,
    pub detector: Box<dyn CodeDetector>,
    pub records: RecordDirectory,
    pub debouncer: Debouncer,
    pub dispatcher: EventDispatcher,
    pub renderer: Box<dyn Renderer>,
    pub commands: Receiver<OperatorCommand>,
    pub sos: SignalOfStop,
}

pub struct ControlLoop {
    state: LoopState,
    clock: Box<dyn Clock>,
    frames: Box<dyn FrameSource>,
    detector: Box<dyn CodeDetector>,
    records: RecordDirectory,
    debouncer: Debouncer,
    dispatcher: EventDispatcher,
    renderer: Box<dyn Renderer>,
    commands: Receiver<OperatorCommand>,
    sos: SignalOfStop,
    frame_budget: Option<Duration>,
    stats_every: u64,
    stats: ScanStats,
}

impl ControlLoop {
    pub fn new(parts: LoopParts) -> Self {
        Self {
            state: LoopState::Running,
            clock: parts.clock,
            frames: parts.frames,
            detector: parts.detector,
            records: parts.records,
            debouncer: parts.debouncer,
            dispatcher: parts.dispatcher,
            renderer: parts.renderer,
            commands: parts.commands,
            sos: parts.sos,
            frame_budget: None,
            stats_every: 0,
            stats: ScanStats::new(),
        }
    }

    /// Pace cycles to at most one per `budget`
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = Some(budget);
        self
    }

    /// Log statistics every `frames` frames (0 disables)
    pub fn with_stats_every(mut self, frames: u64) -> Self {
        self.stats_every = frames;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Run cycles until shutdown, then release everything.
    pub fn run(&mut self) -> ScanStats {
        info!("Control loop started (cooldown {:?})", self.debouncer.cooldown());

        while self.state.is_running() {
            let started = Instant::now();
            self.cycle();

            if let Some(budget) = self.frame_budget
                && self.state.is_running()
            {
                let elapsed = started.elapsed();
                if elapsed < budget {
                    self.sos.wait_timeout(budget - elapsed);
                }
            }
        }

        self.shutdown();
        self.stats.clone()
    }

    /// Execute one cycle; a no-op unless the loop is running.
    pub fn cycle(&mut self) -> LoopState {
        if !self.state.is_running() {
            return self.state;
        }

        self.dispatcher.clear_overlay();

        let frame = match self.frames.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("{}; shutting down", e);
                self.transition(LoopState::ShuttingDown);
                return self.state;
            }
        };
        self.stats.frames += 1;

        let observations = self.detector.detect(&frame);

        for observation in &observations {
            let now = self.clock.now();
            let classification = self.debouncer.evaluate(observation, now);
            let record = self.records.resolve(&observation.text).cloned();

            self.stats.observations += 1;
            match classification {
                Classification::New => {
                    self.stats.new_events += 1;
                    if record.is_none() {
                        self.stats.unknown_codes += 1;
                    }
                }
                Classification::Repeated => self.stats.repeated += 1,
                Classification::Suppressed => self.stats.suppressed += 1,
            }

            self.dispatcher.dispatch(&ScanEvent {
                code: observation.text.clone(),
                record,
                classification,
                geometry: observation.geometry.clone(),
                at: now,
            });
        }

        self.debouncer.end_cycle(observations.len());
        if observations.is_empty() {
            self.stats.empty_frames += 1;
            self.dispatcher.dispatch_idle();
        }

        while let Ok(command) = self.commands.try_recv() {
            self.stats.operator_commands += 1;
            self.dispatcher.dispatch_command(command);
        }

        if let Err(e) = self.renderer.render(&frame, self.dispatcher.overlay()) {
            warn!("Render failed: {:#}", e);
        }
        if let Err(e) = self.renderer.refresh() {
            warn!("Operator surface refresh failed: {:#}", e);
        }

        if self.stats_every > 0 && self.stats.frames % self.stats_every == 0 {
            info!("{}", self.stats);
        }

        if self.sos.cancelled() {
            info!("Quit requested");
            self.transition(LoopState::ShuttingDown);
        }

        self.state
    }

    /// Release frame source, display and command link, in that order.
    pub fn shutdown(&mut self) {
        if self.state.is_stopped() {
            return;
        }
        self.transition(LoopState::ShuttingDown);

        self.frames.release();
        self.renderer.release();
        self.dispatcher.close_link();

        info!("{}", self.stats);
        if self.dispatcher.link_failures() > 0 {
            warn!(
                "{} command link writes failed during this run",
                self.dispatcher.link_failures()
            );
        }
        self.transition(LoopState::Stopped);
        info!("Control loop stopped");
    }

    fn transition(&mut self, target: LoopState) {
        if self.state.can_transition_to(&target) {
            self.state = target;
        } else {
            warn!("Ignoring invalid loop transition {} -> {}", self.state, target);
        }
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
