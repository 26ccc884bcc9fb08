//! This module provides the `TransitionStore`, a sparse map from (state, symbol) cells to
//! possibly incomplete transition entries.
//!
//! Entries keep their three fields as raw strings, exactly as an editor widget produced
//! them. An empty string means "not chosen yet". Values are only checked when a
//! configuration is exported (see `analyzer`).

use crate::types::{Direction, EditorError, Field, StateId, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The output side of a transition cell. Any subset of the fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEntry {
    #[serde(default)]
    pub next_state: String,
    #[serde(default, rename = "newSymbol", alias = "writeSymbol")]
    pub write_symbol: String,
    #[serde(default)]
    pub direction: String,
}

impl TransitionEntry {
    /// Builds a fully specified entry.
    pub fn new(next_state: &str, write_symbol: Symbol, direction: Direction) -> Self {
        Self {
            next_state: next_state.to_string(),
            write_symbol: write_symbol.to_string(),
            direction: direction.code().to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::NextState => &self.next_state,
            Field::WriteSymbol => &self.write_symbol,
            Field::Direction => &self.direction,
        }
    }

    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::NextState => self.next_state = value,
            Field::WriteSymbol => self.write_symbol = value,
            Field::Direction => self.direction = value,
        }
    }

    /// All three fields are filled in.
    pub fn is_complete(&self) -> bool {
        !self.next_state.is_empty() && !self.write_symbol.is_empty() && !self.direction.is_empty()
    }

    /// No field is filled in.
    pub fn is_empty(&self) -> bool {
        self.next_state.is_empty() && self.write_symbol.is_empty() && self.direction.is_empty()
    }

    /// Parses a complete entry into a typed transition.
    ///
    /// Returns `None` when a field is empty or does not hold a legal value.
    pub fn usable(&self) -> Option<Transition> {
        if !self.is_complete() {
            return None;
        }

        let mut symbols = self.write_symbol.chars();
        let write = symbols.next()?;
        if symbols.next().is_some() {
            return None;
        }

        Some(Transition {
            next_state: self.next_state.clone(),
            write,
            direction: self.direction.parse().ok()?,
        })
    }
}

/// A complete, typed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next_state: StateId,
    pub write: Symbol,
    pub direction: Direction,
}

/// Key of a transition cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub state: StateId,
    pub symbol: Symbol,
}

impl CellKey {
    pub fn new(state: &str, symbol: Symbol) -> Self {
        Self {
            state: state.to_string(),
            symbol,
        }
    }
}

/// Sole owner of transition values.
///
/// The synchronizer in `table` adds and removes keys; only `set_field` changes values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionStore {
    cells: BTreeMap<CellKey, TransitionEntry>,
}

impl TransitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one field of an existing cell, leaving the other two untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the cell exists.
    /// * `Err(EditorError::UnknownCell)` if (state, symbol) is not a reconciled key.
    pub fn set_field(
        &mut self,
        state: &str,
        symbol: Symbol,
        field: Field,
        value: impl Into<String>,
    ) -> Result<(), EditorError> {
        let key = CellKey::new(state, symbol);
        let entry = self
            .cells
            .get_mut(&key)
            .ok_or_else(|| EditorError::UnknownCell {
                state: state.to_string(),
                symbol,
            })?;

        let value = value.into();
        debug!(state, %symbol, %field, value = %value, "set transition field");
        entry.set(field, value);
        Ok(())
    }

    pub fn get(&self, state: &str, symbol: Symbol) -> Option<&TransitionEntry> {
        self.cells.get(&CellKey::new(state, symbol))
    }

    pub fn contains(&self, key: &CellKey) -> bool {
        self.cells.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &TransitionEntry)> {
        self.cells.iter()
    }

    /// Cells whose entries parse into complete transitions.
    pub fn usable(&self) -> impl Iterator<Item = (&CellKey, Transition)> + '_ {
        self.cells
            .iter()
            .filter_map(|(key, entry)| entry.usable().map(|t| (key, t)))
    }

    /// The distinct keys, used by the synchronizer to compute set differences.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &CellKey> {
        self.cells.keys()
    }

    /// Inserts an empty entry for a new key. Existing keys are left alone.
    pub(crate) fn insert_empty(&mut self, key: CellKey) -> bool {
        if self.cells.contains_key(&key) {
            return false;
        }
        self.cells.insert(key, TransitionEntry::default());
        true
    }

    /// Inserts an entry verbatim, replacing nothing. Used when adopting a loaded model.
    pub(crate) fn insert_entry(&mut self, key: CellKey, entry: TransitionEntry) {
        self.cells.entry(key).or_insert(entry);
    }

    pub(crate) fn remove(&mut self, key: &CellKey) -> Option<TransitionEntry> {
        self.cells.remove(key)
    }
}
