//! Scan debouncer
//!
//! Decides for every observation whether it is a fresh scan, the same code
//! still sitting in front of the camera, or noise inside the cooldown window.
//!
//! A frame with nothing in view clears the remembered code but not the time
//! of the last event. A code that leaves the view and comes back is
//! therefore a new scan even if the cooldown has not run out yet.

use crate::pipeline::types::{ScanObservation, Timestamp};
use std::time::Duration;

/// Outcome of evaluating one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    New,
    Repeated,
    Suppressed,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::New => write!(f, "New"),
            Classification::Repeated => write!(f, "Repeated"),
            Classification::Suppressed => write!(f, "Suppressed"),
        }
    }
}

/// Last-value / last-time memory of the debouncer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceState {
    pub last_code: Option<String>,
    /// `None` until the first event; an absent time counts as cooled down.
    pub last_event_at: Option<Timestamp>,
}

impl DebounceState {
    fn cooling(&self, now: Timestamp, cooldown: Duration) -> bool {
        match self.last_event_at {
            Some(at) => now.since(at) <= cooldown,
            None => false,
        }
    }

    fn record_event(&mut self, text: &str, now: Timestamp) {
        self.last_code = Some(text.to_string());
        // never move backwards, even if a caller hands us a stale `now`
        self.last_event_at = Some(self.last_event_at.map_or(now, |at| at.max(now)));
    }
}

/// Pure decision function: classify `text` at `now` and update `state`.
pub fn evaluate(
    text: &str,
    state: &mut DebounceState,
    now: Timestamp,
    cooldown: Duration,
) -> Classification {
    let cooling = state.cooling(now, cooldown);

    match state.last_code.as_deref() {
        Some(last) if last == text => {
            if cooling {
                Classification::Repeated
            } else {
                state.record_event(text, now);
                Classification::New
            }
        }
        Some(_) if cooling => {
            state.last_code = Some(text.to_string());
            Classification::Suppressed
        }
        _ => {
            state.record_event(text, now);
            Classification::New
        }
    }
}

/// Owns the debounce state for the lifetime of the control loop
#[derive(Debug, Clone)]
pub struct Debouncer {
    state: DebounceState,
    cooldown: Duration,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: DebounceState::default(),
            cooldown,
        }
    }

    pub fn evaluate(&mut self, observation: &ScanObservation, now: Timestamp) -> Classification {
        evaluate(&observation.text, &mut self.state, now, self.cooldown)
    }

    /// Apply the end-of-cycle rule; only an empty cycle changes anything.
    pub fn end_cycle(&mut self, observations: usize) {
        if observations == 0 {
            self.state.last_code = None;
        }
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
