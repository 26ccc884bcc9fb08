//! This module provides the `StateRegistry`, the ordered list of machine states.
//!
//! States are created with fresh `q<n>` identifiers and removed only from the end of the
//! list, so the registry behaves like a stack whose bottom element (`q0`, the initial
//! state) can never be popped.

use crate::types::{EditorError, StateId, INITIAL_STATE, STATE_PREFIX};
use tracing::info;

/// Owns the states of a machine, the initial state, and the subset of final states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRegistry {
    states: Vec<StateId>,
    final_states: Vec<StateId>,
    counter: usize,
}

impl StateRegistry {
    /// Creates a registry holding only the initial state `q0`.
    pub fn new() -> Self {
        Self {
            states: vec![INITIAL_STATE.to_string()],
            final_states: Vec::new(),
            counter: 1,
        }
    }

    /// Rebuilds a registry from a validated configuration.
    ///
    /// The first state is taken as the initial one. The counter continues after the
    /// highest `q<n>` suffix so that new identifiers never collide with loaded ones.
    pub fn from_parts(states: Vec<StateId>, final_states: Vec<StateId>) -> Self {
        let highest = states
            .iter()
            .filter_map(|s| s.strip_prefix(STATE_PREFIX))
            .filter_map(|n| n.parse::<usize>().ok())
            .map(|n| n + 1)
            .max()
            .unwrap_or(0);

        Self {
            counter: highest.max(states.len()),
            states,
            final_states,
        }
    }

    /// Allocates a new state `q<counter>` and appends it.
    pub fn create_state(&mut self, is_final: bool) -> StateId {
        let state = format!("{}{}", STATE_PREFIX, self.counter);
        self.counter += 1;

        self.states.push(state.clone());
        if is_final {
            self.final_states.push(state.clone());
        }

        info!(state = %state, is_final, "created state");
        state
    }

    /// Removes the most recently added state.
    ///
    /// The counter steps back only when the removed state was the last one issued, so
    /// registries loaded with out-of-order names never reissue a live identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(StateId)` with the removed identifier.
    /// * `Err(EditorError::CannotDeleteInitial)` if only the initial state remains.
    pub fn delete_last(&mut self) -> Result<StateId, EditorError> {
        if self.states.len() <= 1 {
            return Err(EditorError::CannotDeleteInitial);
        }

        let state = self
            .states
            .pop()
            .ok_or(EditorError::CannotDeleteInitial)?;
        self.final_states.retain(|s| s != &state);
        if let Some(previous) = self.counter.checked_sub(1) {
            if state == format!("{}{}", STATE_PREFIX, previous) {
                self.counter = previous;
            }
        }

        info!(state = %state, "deleted state");
        Ok(state)
    }

    /// All states in creation order; the first one is the initial state.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// The final states in the order they were marked.
    pub fn final_states(&self) -> &[StateId] {
        &self.final_states
    }

    /// The initial state. Always `states()[0]`.
    pub fn initial_state(&self) -> &str {
        &self.states[0]
    }

    pub fn is_initial(&self, state: &str) -> bool {
        self.initial_state() == state
    }

    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.iter().any(|s| s == state)
    }

    pub fn contains(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// States that own rows in the editable transition table.
    pub fn non_final_states(&self) -> impl Iterator<Item = &StateId> {
        self.states.iter().filter(|s| !self.is_final(s))
    }

    /// The sequence number the next created state will get.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// A display label: `→ ` before the initial state, ` *` after final states.
    pub fn label(&self, state: &str) -> String {
        let mut label = String::new();
        if self.is_initial(state) {
            label.push_str("→ ");
        }
        label.push_str(state);
        if self.is_final(state) {
            label.push_str(" *");
        }
        label
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
