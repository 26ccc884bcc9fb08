//! This module keeps the transition store in step with the states and the tape alphabet,
//! and builds the editable transition table from it.
//!
//! Reconciliation is a set difference over cell keys. The target set is every
//! (non-final state, tape symbol) pair. Missing keys get an empty entry, surplus keys are
//! dropped, and keys present in both are never touched. Dropping a key really removes its
//! value, so a pair that disappears and comes back starts out empty again.

use crate::alphabet::display_order;
use crate::states::StateRegistry;
use crate::transitions::{CellKey, TransitionEntry, TransitionStore};
use crate::types::{Direction, EditorError, StateId, Symbol};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub inserted: usize,
    pub removed: usize,
}

impl Reconciliation {
    /// Nothing was inserted or removed.
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.removed == 0
    }
}

/// The keys the table should have for the given states and tape alphabet.
pub fn target_keys(registry: &StateRegistry, tape: &[Symbol]) -> BTreeSet<CellKey> {
    registry
        .non_final_states()
        .flat_map(|state| tape.iter().map(move |&symbol| CellKey::new(state, symbol)))
        .collect()
}

/// Brings `store` in line with the current states and tape alphabet.
///
/// Must run after every change to the registry or the alphabets.
pub fn reconcile(
    store: &mut TransitionStore,
    registry: &StateRegistry,
    tape: &[Symbol],
) -> Reconciliation {
    let target = target_keys(registry, tape);

    let stale: Vec<CellKey> = store
        .keys()
        .filter(|key| !target.contains(key))
        .cloned()
        .collect();

    let mut outcome = Reconciliation::default();
    for key in &stale {
        if store.remove(key).is_some() {
            outcome.removed += 1;
        }
    }

    for key in target {
        if store.insert_empty(key) {
            outcome.inserted += 1;
        }
    }

    debug!(
        inserted = outcome.inserted,
        removed = outcome.removed,
        cells = store.len(),
        "reconciled transition table"
    );
    outcome
}

/// One editable row of the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub state: StateId,
    /// State name decorated for display (`→ q0`).
    pub label: String,
    pub symbol: Symbol,
    pub entry: TransitionEntry,
}

/// The editable transition table: one row per (non-final state, symbol), plus the choices
/// an editor offers for each field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    pub rows: Vec<TableRow>,
    pub state_options: Vec<StateId>,
    pub symbol_options: Vec<Symbol>,
    pub direction_options: [Direction; 3],
}

impl TransitionTable {
    /// Builds the table in display order: states in registry order, symbols with `^` first.
    ///
    /// # Returns
    ///
    /// * `Err(EditorError::UnknownCell)` if the store was not reconciled against the same
    ///   registry and alphabet.
    pub fn build(
        registry: &StateRegistry,
        tape: &[Symbol],
        store: &TransitionStore,
    ) -> Result<Self, EditorError> {
        let symbols = display_order(tape);
        let mut rows = Vec::new();

        for state in registry.non_final_states() {
            for &symbol in &symbols {
                let entry = store
                    .get(state, symbol)
                    .ok_or_else(|| EditorError::UnknownCell {
                        state: state.clone(),
                        symbol,
                    })?;

                rows.push(TableRow {
                    state: state.clone(),
                    label: registry.label(state),
                    symbol,
                    entry: entry.clone(),
                });
            }
        }

        Ok(Self {
            rows,
            state_options: registry.states().to_vec(),
            symbol_options: tape.to_vec(),
            direction_options: Direction::ALL,
        })
    }

    pub fn row(&self, state: &str, symbol: Symbol) -> Option<&TableRow> {
        self.rows
            .iter()
            .find(|row| row.state == state && row.symbol == symbol)
    }
}

impl fmt::Display for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .rows
            .iter()
            .map(|row| row.label.chars().count())
            .chain(std::iter::once("State".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:<label_width$}  Read  Next      Write  Move",
            "State"
        )?;

        for row in &self.rows {
            let or_dash = |value: &str| {
                if value.is_empty() {
                    "-".to_string()
                } else {
                    value.to_string()
                }
            };
            let label = &row.label;
            let pad = label_width.saturating_sub(label.chars().count());
            writeln!(
                f,
                "{}{}  {:<4}  {:<8}  {:<5}  {}",
                label,
                " ".repeat(pad),
                row.symbol,
                or_dash(&row.entry.next_state),
                or_dash(&row.entry.write_symbol),
                or_dash(&row.entry.direction),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::normalize;
    use crate::types::Field;

    fn setup() -> (StateRegistry, Vec<Symbol>, TransitionStore) {
        let registry = StateRegistry::new();
        let tape = normalize("01", "").unwrap().tape().to_vec();
        let mut store = TransitionStore::new();
        reconcile(&mut store, &registry, &tape);
        (registry, tape, store)
    }

    #[test]
    fn test_initial_reconcile_creates_all_cells() {
        let (_, _, store) = setup();

        assert_eq!(store.len(), 4);
        assert!(store.iter().all(|(_, entry)| entry.is_empty()));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (registry, tape, mut store) = setup();

        let second = reconcile(&mut store, &registry, &tape);
        assert!(second.is_noop());
        let third = reconcile(&mut store, &registry, &tape);
        assert_eq!(third, Reconciliation::default());
    }

    #[test]
    fn test_final_states_get_no_cells() {
        let (mut registry, tape, mut store) = setup();
        registry.create_state(true);

        let outcome = reconcile(&mut store, &registry, &tape);
        assert!(outcome.is_noop());
        assert!(store.get("q1", '0').is_none());
    }

    #[test]
    fn test_partial_edit_survives_unrelated_state() {
        let (mut registry, tape, mut store) = setup();
        store.set_field("q0", '1', Field::Direction, "L").unwrap();

        registry.create_state(false);
        let outcome = reconcile(&mut store, &registry, &tape);

        assert_eq!(outcome.inserted, 4);
        assert_eq!(outcome.removed, 0);
        assert_eq!(store.get("q0", '1').unwrap().direction, "L");
    }

    #[test]
    fn test_recreated_pair_starts_empty() {
        let (mut registry, tape, mut store) = setup();
        registry.create_state(false);
        reconcile(&mut store, &registry, &tape);
        store.set_field("q1", '0', Field::NextState, "q0").unwrap();

        registry.delete_last().unwrap();
        let outcome = reconcile(&mut store, &registry, &tape);
        assert_eq!(outcome.removed, 4);

        registry.create_state(false);
        reconcile(&mut store, &registry, &tape);
        assert!(store.get("q1", '0').unwrap().is_empty());
    }

    #[test]
    fn test_alphabet_change_drops_removed_symbol() {
        let (registry, _, mut store) = setup();
        store.set_field("q0", '0', Field::WriteSymbol, "1").unwrap();

        let tape = normalize("1", "").unwrap().tape().to_vec();
        let outcome = reconcile(&mut store, &registry, &tape);

        assert_eq!(outcome.removed, 1);
        assert!(store.get("q0", '0').is_none());
    }

    #[test]
    fn test_table_rows_in_display_order() {
        let (mut registry, tape, mut store) = setup();
        registry.create_state(false);
        registry.create_state(true);
        reconcile(&mut store, &registry, &tape);

        let table = TransitionTable::build(&registry, &tape, &store).unwrap();
        let keys: Vec<(String, char)> = table
            .rows
            .iter()
            .map(|row| (row.state.clone(), row.symbol))
            .collect();

        assert_eq!(keys.len(), 8);
        assert_eq!(keys[0], ("q0".to_string(), '^'));
        assert_eq!(keys[3], ("q0".to_string(), '_'));
        assert_eq!(keys[4], ("q1".to_string(), '^'));
        assert_eq!(table.rows[0].label, "→ q0");
        assert_eq!(table.state_options.len(), 3);
        assert_eq!(table.symbol_options, vec!['0', '1', '^', '_']);
    }

    #[test]
    fn test_table_detects_unreconciled_store() {
        let (mut registry, tape, store) = setup();
        registry.create_state(false);

        let result = TransitionTable::build(&registry, &tape, &store);
        assert!(matches!(result, Err(EditorError::UnknownCell { .. })));
    }
}
