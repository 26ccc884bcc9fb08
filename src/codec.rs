//! This module defines the canonical `Configuration` document and converts it to and from
//! JSON.
//!
//! Decoding only checks the document's shape. Cross-field invariants (initial state in
//! the state list and so on) are the analyzer's job, so callers handling untrusted files
//! must run `analyzer::analyze` before adopting the result.

use crate::alphabet::auxiliary_symbols;
use crate::transitions::TransitionEntry;
use crate::types::{EditorError, StateId, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transition cells grouped by state, then by read symbol.
pub type TransitionMap = BTreeMap<StateId, BTreeMap<Symbol, TransitionEntry>>;

/// The serializable machine definition shared by save, load, and execute requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default, alias = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "alphabet")]
    pub input_alphabet: Vec<Symbol>,
    pub tape_alphabet: Vec<Symbol>,
    pub states: Vec<StateId>,
    /// Optional at decode time so that a missing value surfaces as an invariant violation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<StateId>,
    pub final_states: Vec<StateId>,
    pub transitions: TransitionMap,
}

impl Configuration {
    /// Tape symbols that are neither input symbols nor reserved.
    pub fn auxiliary_symbols(&self) -> Vec<Symbol> {
        auxiliary_symbols(&self.input_alphabet, &self.tape_alphabet)
    }

    /// Number of cells holding a complete, parseable transition.
    pub fn usable_transitions(&self) -> usize {
        self.transitions
            .values()
            .flat_map(|cells| cells.values())
            .filter(|entry| entry.usable().is_some())
            .count()
    }
}

/// Anything that can be snapshotted into a `Configuration`.
pub trait Snapshot {
    fn snapshot(&self) -> Configuration;
}

/// Copies a model into its canonical document form.
pub fn serialize<M: Snapshot>(model: &M) -> Configuration {
    model.snapshot()
}

/// Decodes a JSON document.
///
/// # Returns
///
/// * `Err(EditorError::MalformedConfiguration)` when the text is not JSON, a required
///   field is missing, or a field has the wrong shape.
pub fn deserialize(raw: &str) -> Result<Configuration, EditorError> {
    serde_json::from_str(raw).map_err(|e| EditorError::MalformedConfiguration(e.to_string()))
}

/// Decodes an already-parsed JSON value, e.g. a response body.
pub fn from_value(value: serde_json::Value) -> Result<Configuration, EditorError> {
    serde_json::from_value(value).map_err(|e| EditorError::MalformedConfiguration(e.to_string()))
}

/// Encodes a configuration as pretty-printed JSON.
pub fn to_json(config: &Configuration) -> Result<String, EditorError> {
    serde_json::to_string_pretty(config)
        .map_err(|e| EditorError::MalformedConfiguration(e.to_string()))
}
