//! Authentication flow state machine.
//!
//! Both nodes walk the same states while they exchange passwords:
//!
//! - `CollectingPrimary`: waiting for (interface: typing) the first password
//! - `CollectingConfirmation`: the second password of a set/change flow
//! - `Verifying`: the match result is being computed or awaited
//! - `Locked`: too many wrong passwords, the alarm runs
//!
//! # Valid Transitions
//!
//! - CollectingPrimary → CollectingConfirmation → Verifying (set/change)
//! - CollectingPrimary → Verifying (verify)
//! - Verifying → CollectingPrimary (result known) or Locked (cap reached)
//! - CollectingPrimary → Locked (alarm byte received, interface cap exceeded)
//! - Locked → CollectingPrimary (alarm finished)
//!
//! ```
//! use doorlock_control::auth::{AuthState, AuthStateMachine};
//!
//! let mut machine = AuthStateMachine::new();
//! machine.transition_to(AuthState::Verifying).unwrap();
//! machine.transition_to(AuthState::Locked).unwrap();
//!
//! assert!(machine.transition_to(AuthState::Verifying).is_err());
//! assert_eq!(machine.history().len(), 2);
//! ```

use doorlock_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Maximum number of transitions kept in history.
///
/// A verify round records two transitions, a set/change round three.
const MAX_HISTORY_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// First (or only) password of a flow.
    CollectingPrimary,

    /// Re-entered password of a set/change flow.
    CollectingConfirmation,

    /// Match result pending.
    Verifying,

    /// Lockout in progress.
    Locked,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AuthState::CollectingPrimary => "CollectingPrimary",
            AuthState::CollectingConfirmation => "CollectingConfirmation",
            AuthState::Verifying => "Verifying",
            AuthState::Locked => "Locked",
        };
        write!(f, "{}", state_str)
    }
}

impl AuthState {
    /// Check if a transition to `target` is valid from this state.
    ///
    /// ```
    /// use doorlock_control::auth::AuthState;
    ///
    /// assert!(AuthState::CollectingPrimary.can_transition_to(&AuthState::CollectingConfirmation));
    /// assert!(!AuthState::CollectingConfirmation.can_transition_to(&AuthState::Locked));
    /// ```
    pub fn can_transition_to(&self, target: &AuthState) -> bool {
        matches!(
            (self, target),
            (
                AuthState::CollectingPrimary,
                AuthState::CollectingConfirmation | AuthState::Verifying | AuthState::Locked
            ) | (AuthState::CollectingConfirmation, AuthState::Verifying)
                | (
                    AuthState::Verifying,
                    AuthState::CollectingPrimary | AuthState::Locked
                )
                | (AuthState::Locked, AuthState::CollectingPrimary)
        )
    }
}

/// A recorded state change.
///
/// `timestamp` is not serialized; a deserialized record carries the time of
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTransition {
    pub from: AuthState,
    pub to: AuthState,
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl AuthTransition {
    pub fn new(from: AuthState, to: AuthState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Validated authentication state with a bounded transition history.
#[derive(Debug)]
pub struct AuthStateMachine {
    current_state: AuthState,
    history: VecDeque<AuthTransition>,
}

impl AuthStateMachine {
    /// Start in `CollectingPrimary`.
    pub fn new() -> Self {
        Self {
            current_state: AuthState::CollectingPrimary,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> &AuthState {
        &self.current_state
    }

    pub fn is_locked(&self) -> bool {
        self.current_state == AuthState::Locked
    }

    /// Transitions, oldest first.
    pub fn history(&self) -> &VecDeque<AuthTransition> {
        &self.history
    }

    pub fn last_transitions(&self, count: usize) -> Vec<AuthTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Move to `new_state`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the move is not allowed;
    /// the machine is left unchanged.
    pub fn transition_to(&mut self, new_state: AuthState) -> Result<AuthTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = AuthTransition::new(self.current_state, new_state);
        self.record(transition.clone());
        Ok(transition)
    }

    /// Force `CollectingPrimary` regardless of the current state.
    pub fn reset(&mut self) -> AuthTransition {
        let transition = AuthTransition::new(self.current_state, AuthState::CollectingPrimary);
        self.record(transition.clone());
        transition
    }

    fn record(&mut self, transition: AuthTransition) {
        debug!(from = %transition.from, to = %transition.to, "Auth state transition");
        self.current_state = transition.to;
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition);
    }
}

impl Default for AuthStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use super::AuthState::*;

    #[test]
    fn test_new_machine_collects_primary() {
        let machine = AuthStateMachine::new();
        assert_eq!(machine.current_state(), &CollectingPrimary);
        assert!(machine.history().is_empty());
        assert!(!machine.is_locked());
    }

    #[rstest]
    #[case(CollectingPrimary, CollectingConfirmation, true)]
    #[case(CollectingPrimary, Verifying, true)]
    #[case(CollectingPrimary, Locked, true)]
    #[case(CollectingPrimary, CollectingPrimary, false)]
    #[case(CollectingConfirmation, Verifying, true)]
    #[case(CollectingConfirmation, CollectingPrimary, false)]
    #[case(CollectingConfirmation, Locked, false)]
    #[case(Verifying, CollectingPrimary, true)]
    #[case(Verifying, Locked, true)]
    #[case(Verifying, CollectingConfirmation, false)]
    #[case(Locked, CollectingPrimary, true)]
    #[case(Locked, Verifying, false)]
    fn test_transition_table(#[case] from: AuthState, #[case] to: AuthState, #[case] valid: bool) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_set_new_round() {
        let mut machine = AuthStateMachine::new();
        machine.transition_to(CollectingConfirmation).unwrap();
        machine.transition_to(Verifying).unwrap();
        let last = machine.transition_to(CollectingPrimary).unwrap();

        assert_eq!(last.from, Verifying);
        assert_eq!(last.to, CollectingPrimary);
        assert_eq!(machine.history().len(), 3);
    }

    #[test]
    fn test_invalid_transition_leaves_state() {
        let mut machine = AuthStateMachine::new();
        machine.transition_to(CollectingConfirmation).unwrap();

        let err = machine.transition_to(Locked).unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
        assert_eq!(machine.current_state(), &CollectingConfirmation);
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn test_reset_from_anywhere() {
        let mut machine = AuthStateMachine::new();
        machine.transition_to(CollectingConfirmation).unwrap();

        let transition = machine.reset();
        assert_eq!(transition.from, CollectingConfirmation);
        assert_eq!(machine.current_state(), &CollectingPrimary);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = AuthStateMachine::new();
        for _ in 0..MAX_HISTORY_SIZE {
            machine.transition_to(Verifying).unwrap();
            machine.transition_to(CollectingPrimary).unwrap();
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(machine.last_transitions(1)[0].to, CollectingPrimary);
        assert_eq!(machine.last_transitions(2)[0].to, Verifying);
    }

    #[test]
    fn test_transition_serde_skips_timestamp() {
        let transition = AuthTransition::new(Verifying, Locked);
        let json = serde_json::to_string(&transition).unwrap();
        assert_eq!(json, r#"{"from":"verifying","to":"locked"}"#);

        let back: AuthTransition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to, Locked);
    }
}
