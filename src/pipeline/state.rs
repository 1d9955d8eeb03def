//! Control loop state management

/// Control loop state machine
///
/// `Running` is the only state in which cycles execute. `ShuttingDown` is
/// entered on a fatal frame error or a quit request, and `Stopped` once all
/// resources are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Loop is processing frames
    Running,

    /// Loop is releasing its resources
    ShuttingDown,

    /// All resources released; cannot be restarted
    Stopped,
}

impl LoopState {
    /// Check if this state transition is valid
    pub fn can_transition_to(&self, target: &LoopState) -> bool {
        use LoopState::*;

        match (self, target) {
            (Running, ShuttingDown) => true,
            (ShuttingDown, Stopped) => true,

            // From Stopped - no transitions allowed
            (Stopped, _) => false,

            // Self-transitions
            (a, b) if a == b => true,

            _ => false,
        }
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            LoopState::Running => "Running",
            LoopState::ShuttingDown => "ShuttingDown",
            LoopState::Stopped => "Stopped",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, LoopState::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, LoopState::Stopped)
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let running = LoopState::Running;
        let shutting_down = LoopState::ShuttingDown;
        let stopped = LoopState::Stopped;

        assert!(running.can_transition_to(&shutting_down));
        assert!(shutting_down.can_transition_to(&stopped));
        assert!(shutting_down.can_transition_to(&shutting_down));
    }

    #[test]
    fn test_invalid_transitions() {
        let running = LoopState::Running;
        let shutting_down = LoopState::ShuttingDown;
        let stopped = LoopState::Stopped;

        assert!(!running.can_transition_to(&stopped)); // Must release resources first
        assert!(!shutting_down.can_transition_to(&running));
        assert!(!stopped.can_transition_to(&running));
        assert!(!stopped.can_transition_to(&stopped));
    }

    #[test]
    fn test_state_checks() {
        let running = LoopState::Running;
        assert!(running.is_running());
        assert!(!LoopState::ShuttingDown.is_running());
        assert!(LoopState::Stopped.is_stopped());
        assert_eq!(LoopState::ShuttingDown.to_string(), "ShuttingDown");
    }
}
