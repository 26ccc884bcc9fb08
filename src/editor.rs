//! This module defines the `Editor`, the single context object that owns a machine
//! definition while it is being edited.
//!
//! Every user action goes through an `Editor` method, which mutates the registry or the
//! alphabets and then reconciles the transition store before returning. Failing actions
//! leave the editor untouched.

use crate::alphabet::{normalize, Alphabets};
use crate::analyzer::{analyze, analyze_complete};
use crate::codec::{Configuration, Snapshot, TransitionMap};
use crate::matrix::{project, Matrix};
use crate::states::StateRegistry;
use crate::table::{reconcile, Reconciliation, TransitionTable};
use crate::transitions::{CellKey, TransitionStore};
use crate::types::{EditorError, Field, StateId, Symbol};
use tracing::{debug, info};

/// Result of filtering a raw tape input against the input alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedInput {
    /// The input with every unknown character removed.
    pub accepted: String,
    /// Distinct removed characters, in first-occurrence order.
    pub rejected: Vec<char>,
}

/// The machine definition being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    name: Option<String>,
    description: Option<String>,
    alphabets: Option<Alphabets>,
    registry: StateRegistry,
    store: TransitionStore,
}

impl Editor {
    /// Creates an editor holding only the initial state and no alphabets.
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            alphabets: None,
            registry: StateRegistry::new(),
            store: TransitionStore::new(),
        }
    }

    /// Validates `config` and builds an editor from it.
    ///
    /// Transition values are kept verbatim. Cells the document leaves out are added as
    /// empty entries.
    ///
    /// Cell values are not checked here, so a model saved mid-edit with dangling
    /// references can be adopted again.
    ///
    /// # Returns
    ///
    /// * `Err(EditorError::InconsistentConfiguration)` if a structural invariant is violated.
    pub fn adopt(config: Configuration) -> Result<Self, EditorError> {
        analyze(&config)?;

        let Configuration {
            name,
            description,
            input_alphabet,
            tape_alphabet,
            mut states,
            initial_state,
            final_states,
            transitions,
        } = config;

        // The registry keeps the initial state at index 0.
        if let Some(initial) = initial_state {
            if let Some(position) = states.iter().position(|s| *s == initial) {
                let initial = states.remove(position);
                states.insert(0, initial);
            }
        }

        let mut store = TransitionStore::new();
        for (state, cells) in transitions {
            for (symbol, entry) in cells {
                store.insert_entry(CellKey::new(&state, symbol), entry);
            }
        }

        let mut editor = Self {
            name,
            description,
            alphabets: Some(Alphabets::from_parts(input_alphabet, tape_alphabet)),
            registry: StateRegistry::from_parts(states, final_states),
            store,
        };
        editor.sync();

        info!(
            name = editor.name.as_deref().unwrap_or(""),
            states = editor.registry.states().len(),
            cells = editor.store.len(),
            "adopted configuration"
        );
        Ok(editor)
    }

    /// Sets the optional name and description. Blank strings clear the value.
    pub fn set_metadata(&mut self, name: Option<&str>, description: Option<&str>) {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        self.name = clean(name);
        self.description = clean(description);
    }

    /// Normalizes the alphabets and (re)generates the transition table.
    pub fn set_alphabets(
        &mut self,
        input_raw: &str,
        auxiliary_raw: &str,
    ) -> Result<Reconciliation, EditorError> {
        let alphabets = normalize(input_raw.trim(), auxiliary_raw.trim())?;
        debug!(tape = ?alphabets.tape(), "alphabets set");

        self.alphabets = Some(alphabets);
        Ok(self.sync())
    }

    /// Adds a state and gives it table rows unless it is final.
    pub fn add_state(&mut self, is_final: bool) -> StateId {
        let state = self.registry.create_state(is_final);
        self.sync();
        state
    }

    /// Removes the most recently added state and its table rows.
    pub fn delete_last_state(&mut self) -> Result<StateId, EditorError> {
        let state = self.registry.delete_last()?;
        self.sync();
        Ok(state)
    }

    /// Edits one field of one transition cell.
    pub fn set_field(
        &mut self,
        state: &str,
        symbol: Symbol,
        field: Field,
        value: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.store.set_field(state, symbol, field, value)
    }

    /// The editable transition table.
    pub fn table(&self) -> Result<TransitionTable, EditorError> {
        let alphabets = self.alphabets()?;
        TransitionTable::build(&self.registry, alphabets.tape(), &self.store)
    }

    /// The read-only matrix view. Without alphabets the matrix has rows but no columns.
    pub fn matrix(&self) -> Matrix {
        let tape = self.alphabets.as_ref().map(Alphabets::tape).unwrap_or(&[]);
        project(&self.registry, tape, &self.store)
    }

    /// A validated snapshot, ready to be saved or sent for execution.
    ///
    /// Unlike `adopt`, this also rejects cells that refer to a missing state or symbol.
    pub fn export(&self) -> Result<Configuration, EditorError> {
        self.alphabets()?;
        let config = self.snapshot();
        analyze_complete(&config)?;
        Ok(config)
    }

    /// Keeps only the characters of `raw` that belong to the input alphabet.
    ///
    /// Without alphabets the input passes through unchanged.
    pub fn sanitize_input(&self, raw: &str) -> SanitizedInput {
        let Some(alphabets) = &self.alphabets else {
            return SanitizedInput {
                accepted: raw.to_string(),
                rejected: Vec::new(),
            };
        };

        let mut rejected = Vec::new();
        let accepted = raw
            .chars()
            .filter(|&c| {
                let ok = alphabets.accepts_input(c);
                if !ok && !rejected.contains(&c) {
                    rejected.push(c);
                }
                ok
            })
            .collect();

        SanitizedInput { accepted, rejected }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn store(&self) -> &TransitionStore {
        &self.store
    }

    /// Whether the alphabets have been set and the table exists.
    pub fn is_table_generated(&self) -> bool {
        self.alphabets.is_some()
    }

    pub fn alphabets(&self) -> Result<&Alphabets, EditorError> {
        self.alphabets.as_ref().ok_or(EditorError::TableNotGenerated)
    }

    fn sync(&mut self) -> Reconciliation {
        match &self.alphabets {
            Some(alphabets) => reconcile(&mut self.store, &self.registry, alphabets.tape()),
            None => Reconciliation::default(),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot for Editor {
    fn snapshot(&self) -> Configuration {
        let mut transitions = TransitionMap::new();
        for (key, entry) in self.store.iter() {
            transitions
                .entry(key.state.clone())
                .or_default()
                .insert(key.symbol, entry.clone());
        }

        let (input_alphabet, tape_alphabet) = match &self.alphabets {
            Some(alphabets) => (alphabets.input().to_vec(), alphabets.tape().to_vec()),
            None => (Vec::new(), Vec::new()),
        };

        Configuration {
            name: self.name.clone(),
            description: self.description.clone(),
            input_alphabet,
            tape_alphabet,
            states: self.registry.states().to_vec(),
            initial_state: Some(self.registry.initial_state().to_string()),
            final_states: self.registry.final_states().to_vec(),
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{deserialize, serialize, to_json};
    use crate::types::PLACEHOLDER;
    use proptest::prelude::*;

    fn binary_editor() -> Editor {
        let mut editor = Editor::new();
        editor.set_alphabets("01", "").unwrap();
        editor
    }

    #[test]
    fn test_binary_scenario() {
        let mut editor = binary_editor();
        let q1 = editor.add_state(false);
        assert_eq!(q1, "q1");

        editor.set_field("q0", '0', Field::NextState, "q1").unwrap();
        editor.set_field("q0", '0', Field::WriteSymbol, "1").unwrap();
        editor.set_field("q0", '0', Field::Direction, "R").unwrap();

        let matrix = editor.matrix();
        assert_eq!(matrix.columns, vec!['^', '0', '1', '_']);
        assert_eq!(matrix.cell("q0", '0'), Some("(q1, 1, →)"));
        for row in &matrix.rows {
            for (symbol, cell) in matrix.columns.iter().zip(&row.cells) {
                if !(row.state == "q0" && *symbol == '0') {
                    assert_eq!(cell, PLACEHOLDER);
                }
            }
        }
    }

    #[test]
    fn test_invalid_alphabet_leaves_model_untouched() {
        let mut editor = binary_editor();
        editor.set_field("q0", '1', Field::WriteSymbol, "0").unwrap();
        let before = editor.clone();

        assert!(editor.set_alphabets("0 1", "").is_err());
        assert!(editor.set_alphabets("", "").is_err());
        assert_eq!(editor, before);
    }

    #[test]
    fn test_table_requires_alphabets() {
        let editor = Editor::new();

        assert_eq!(editor.table().unwrap_err(), EditorError::TableNotGenerated);
        assert_eq!(editor.export().unwrap_err(), EditorError::TableNotGenerated);
        assert_eq!(editor.matrix().rows.len(), 1);
        assert!(editor.matrix().columns.is_empty());
    }

    #[test]
    fn test_stale_cell_after_delete() {
        let mut editor = binary_editor();
        editor.add_state(false);
        editor.delete_last_state().unwrap();

        let result = editor.set_field("q1", '0', Field::Direction, "L");
        assert!(matches!(result, Err(EditorError::UnknownCell { .. })));
    }

    #[test]
    fn test_delete_initial_state() {
        let mut editor = binary_editor();
        let before = editor.clone();

        assert_eq!(
            editor.delete_last_state(),
            Err(EditorError::CannotDeleteInitial)
        );
        assert_eq!(editor, before);
    }

    #[test]
    fn test_export_rejects_illegal_values() {
        let mut editor = binary_editor();
        editor
            .set_field("q0", '0', Field::NextState, "q42")
            .unwrap();

        assert!(matches!(
            editor.export(),
            Err(EditorError::InconsistentConfiguration(_))
        ));
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut editor = binary_editor();
        editor.set_metadata(Some("Flipper"), Some("flips the first bit"));
        editor.add_state(false);
        editor.add_state(true);
        editor.set_field("q0", '0', Field::NextState, "q2").unwrap();
        editor.set_field("q1", '^', Field::Direction, "S").unwrap();

        let json = to_json(&serialize(&editor)).unwrap();
        let restored = Editor::adopt(deserialize(&json).unwrap()).unwrap();

        assert_eq!(restored, editor);
    }

    #[test]
    fn test_dangling_reference_survives_round_trip() {
        let mut editor = binary_editor();
        editor.add_state(false);
        editor.set_field("q0", '0', Field::NextState, "q1").unwrap();
        editor.delete_last_state().unwrap();

        assert_eq!(editor.store().get("q0", '0').unwrap().next_state, "q1");
        assert!(editor.export().is_err());

        let json = to_json(&serialize(&editor)).unwrap();
        let restored = Editor::adopt(deserialize(&json).unwrap()).unwrap();
        assert_eq!(restored, editor);
    }

    #[test]
    fn test_adopt_fills_missing_cells() {
        let raw = r#"{
            "inputAlphabet": ["a"],
            "tapeAlphabet": ["a", "^", "_"],
            "states": ["q0", "q1"],
            "initialState": "q0",
            "finalStates": ["q1"],
            "transitions": { "q0": { "a": { "nextState": "q1", "newSymbol": "a", "direction": "R" } } }
        }"#;

        let editor = Editor::adopt(deserialize(raw).unwrap()).unwrap();

        assert_eq!(editor.store().len(), 3);
        assert!(editor.store().get("q0", 'a').unwrap().is_complete());
        assert!(editor.store().get("q0", '_').unwrap().is_empty());
        assert_eq!(editor.registry().counter(), 2);
    }

    #[test]
    fn test_adopt_missing_initial_state() {
        let raw = r#"{
            "inputAlphabet": ["a"],
            "tapeAlphabet": ["a", "^", "_"],
            "states": ["q0"],
            "finalStates": [],
            "transitions": {}
        }"#;

        let result = Editor::adopt(deserialize(raw).unwrap());
        assert!(matches!(
            result,
            Err(EditorError::InconsistentConfiguration(_))
        ));
    }

    #[test]
    fn test_sanitize_input() {
        let editor = binary_editor();

        let clean = editor.sanitize_input("01a10b2a");
        assert_eq!(clean.accepted, "0110");
        assert_eq!(clean.rejected, vec!['a', 'b', '2']);

        let untouched = Editor::new().sanitize_input("xyz");
        assert_eq!(untouched.accepted, "xyz");
        assert!(untouched.rejected.is_empty());
    }

    #[test]
    fn test_metadata_blank_clears() {
        let mut editor = Editor::new();
        editor.set_metadata(Some("  Busy  "), Some("   "));

        assert_eq!(editor.name(), Some("Busy"));
        assert_eq!(editor.description(), None);
    }

    proptest! {
        #[test]
        fn prop_round_trip_law(
            input in "[a-c0-2]{1,4}",
            aux in "[X-Z]{0,2}",
            actions in proptest::collection::vec(0u8..3, 0..8),
        ) {
            let mut editor = Editor::new();
            editor.set_alphabets(&input, &aux).unwrap();
            for action in actions {
                match action {
                    0 => { editor.add_state(false); }
                    1 => { editor.add_state(true); }
                    _ => { let _ = editor.delete_last_state(); }
                }
            }
            let first = editor.registry().non_final_states().next().cloned();
            if let Some(state) = first {
                let symbol = editor.alphabets().unwrap().input()[0];
                editor.set_field(&state, symbol, Field::Direction, "L").unwrap();
            }

            let json = to_json(&serialize(&editor)).unwrap();
            let restored = Editor::adopt(deserialize(&json).unwrap()).unwrap();
            prop_assert_eq!(restored, editor);
        }

        #[test]
        fn prop_partial_edit_preserved_across_new_states(extra in 1usize..5) {
            let mut editor = Editor::new();
            editor.set_alphabets("ab", "").unwrap();
            editor.set_field("q0", 'b', Field::Direction, "R").unwrap();

            for i in 0..extra {
                editor.add_state(i % 2 == 0);
            }

            prop_assert_eq!(&editor.store().get("q0", 'b').unwrap().direction, "R");
            prop_assert!(editor.store().get("q0", 'b').unwrap().next_state.is_empty());
        }
    }
}
