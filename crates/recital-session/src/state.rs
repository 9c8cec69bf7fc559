//! Session state machine.
//!
//! Enforces valid transitions for the interactive loop:
//! - Displaying -> AwaitingKey (sentence rendered)
//! - Displaying -> EmptyCollection (nothing to render)
//! - AwaitingKey -> Displaying (navigation, ignored key)
//! - AwaitingKey -> Recording | Reloading
//! - Recording -> Displaying (success or recovered failure)
//! - Reloading -> Displaying | EmptyCollection
//! - EmptyCollection -> Reloading
//! - ErrorRecovery -> Displaying | EmptyCollection (operator chose to continue)
//! - any non-terminal state -> ErrorRecovery (unhandled fault)
//! - any non-terminal state -> Exiting (quit or interrupt)

use std::fmt;

use recital_core::error::RecitalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Rendering the current sentence and any pending notices.
    Displaying,
    /// Blocked on the next key.
    AwaitingKey,
    /// Synthesizing, saving and playing the current sentence.
    Recording,
    /// Re-reading the text file and reconciling the cursor.
    Reloading,
    /// No sentences; only reload and quit are accepted.
    EmptyCollection,
    /// A fault was reported; waiting for the operator to quit or continue.
    ErrorRecovery,
    /// Terminal.
    Exiting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Displaying => write!(f, "Displaying"),
            SessionState::AwaitingKey => write!(f, "AwaitingKey"),
            SessionState::Recording => write!(f, "Recording"),
            SessionState::Reloading => write!(f, "Reloading"),
            SessionState::EmptyCollection => write!(f, "EmptyCollection"),
            SessionState::ErrorRecovery => write!(f, "ErrorRecovery"),
            SessionState::Exiting => write!(f, "Exiting"),
        }
    }
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Exiting)
    }

    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;

        if self.is_terminal() {
            return false;
        }
        match target {
            Exiting => return true,
            ErrorRecovery => return *self != ErrorRecovery,
            _ => {}
        }
        matches!(
            (self, target),
            (Displaying, AwaitingKey)
                | (Displaying, EmptyCollection)
                | (AwaitingKey, Displaying)
                | (AwaitingKey, Recording)
                | (AwaitingKey, Reloading)
                | (Recording, Displaying)
                | (Reloading, Displaying)
                | (Reloading, EmptyCollection)
                | (EmptyCollection, Reloading)
                | (ErrorRecovery, Displaying)
                | (ErrorRecovery, EmptyCollection)
        )
    }
}

/// Validating holder for the current [`SessionState`].
///
/// The session is single-threaded, so unlike a shared state machine this
/// one is owned directly by the controller.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: SessionState,
}

impl StateMachine {
    pub fn new(initial: SessionState) -> Self {
        Self { state: initial }
    }

    pub fn current(&self) -> SessionState {
        self.state
    }

    /// Attempt to transition to the target state.
    ///
    /// Returns a [`RecitalError::Session`] and leaves the state untouched if
    /// the transition is not allowed.
    pub fn transition(&mut self, target: SessionState) -> Result<(), RecitalError> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Session state: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(RecitalError::Session(format!(
                "Invalid state transition: {} -> {}",
                self.state, target
            )))
        }
    }

    /// Set the state without validation (fault handling only).
    pub fn force(&mut self, target: SessionState) {
        tracing::warn!("Session state forced: {} -> {}", self.state, target);
        self.state = target;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    const ALL: [SessionState; 7] = [
        Displaying,
        AwaitingKey,
        Recording,
        Reloading,
        EmptyCollection,
        ErrorRecovery,
        Exiting,
    ];

    #[test]
    fn test_state_display() {
        assert_eq!(Displaying.to_string(), "Displaying");
        assert_eq!(EmptyCollection.to_string(), "EmptyCollection");
        assert_eq!(ErrorRecovery.to_string(), "ErrorRecovery");
        assert_eq!(Exiting.to_string(), "Exiting");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(Displaying.can_transition_to(&AwaitingKey));
        assert!(Displaying.can_transition_to(&EmptyCollection));
        assert!(AwaitingKey.can_transition_to(&Displaying));
        assert!(AwaitingKey.can_transition_to(&Recording));
        assert!(AwaitingKey.can_transition_to(&Reloading));
        assert!(Recording.can_transition_to(&Displaying));
        assert!(Reloading.can_transition_to(&Displaying));
        assert!(Reloading.can_transition_to(&EmptyCollection));
        assert!(EmptyCollection.can_transition_to(&Reloading));
        assert!(ErrorRecovery.can_transition_to(&Displaying));
        assert!(ErrorRecovery.can_transition_to(&EmptyCollection));
    }

    #[test]
    fn test_every_live_state_can_exit() {
        for state in ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(state.can_transition_to(&Exiting), "{} -> Exiting", state);
        }
    }

    #[test]
    fn test_faults_reach_error_recovery_once() {
        for state in ALL.iter().filter(|s| !s.is_terminal()) {
            assert_eq!(
                state.can_transition_to(&ErrorRecovery),
                *state != ErrorRecovery,
                "{} -> ErrorRecovery",
                state
            );
        }
    }

    #[test]
    fn test_exiting_is_terminal() {
        for target in ALL {
            assert!(!Exiting.can_transition_to(&target));
        }
    }

    #[test]
    fn test_invalid_transitions() {
        // Recording and reloading only start from a key.
        assert!(!Displaying.can_transition_to(&Recording));
        assert!(!Displaying.can_transition_to(&Reloading));
        // Empty collection cannot record or navigate.
        assert!(!EmptyCollection.can_transition_to(&Recording));
        assert!(!EmptyCollection.can_transition_to(&Displaying));
        assert!(!EmptyCollection.can_transition_to(&AwaitingKey));
        // Recording never lands in the empty screen.
        assert!(!Recording.can_transition_to(&EmptyCollection));
        // No self loops.
        for state in ALL {
            assert!(!state.can_transition_to(&state), "{} -> {}", state, state);
        }
    }

    #[test]
    fn test_state_machine_record_cycle() {
        let mut sm = StateMachine::new(Displaying);
        sm.transition(AwaitingKey).unwrap();
        sm.transition(Recording).unwrap();
        sm.transition(Displaying).unwrap();
        assert_eq!(sm.current(), Displaying);
    }

    #[test]
    fn test_state_machine_reload_to_empty_and_back() {
        let mut sm = StateMachine::new(Displaying);
        sm.transition(AwaitingKey).unwrap();
        sm.transition(Reloading).unwrap();
        sm.transition(EmptyCollection).unwrap();
        sm.transition(Reloading).unwrap();
        sm.transition(Displaying).unwrap();
        assert_eq!(sm.current(), Displaying);
    }

    #[test]
    fn test_state_machine_invalid_transition_keeps_state() {
        let mut sm = StateMachine::new(EmptyCollection);
        let result = sm.transition(Recording);
        assert!(matches!(result, Err(RecitalError::Session(_))));
        assert_eq!(sm.current(), EmptyCollection);
    }

    #[test]
    fn test_force_bypasses_validation() {
        let mut sm = StateMachine::new(ErrorRecovery);
        sm.force(ErrorRecovery);
        assert_eq!(sm.current(), ErrorRecovery);
    }
}
