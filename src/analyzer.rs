//! This module provides functions for checking a `Configuration` against the model
//! invariants. `analyze` covers the structure that every stored model must keep, and
//! `analyze_complete` adds the cell-value checks run before a model is saved or executed.

use crate::alphabet::{is_reserved, is_valid_alphabet};
use crate::codec::Configuration;
use crate::types::{Direction, EditorError, StateId, Symbol, BLANK_SYMBOL, HEAD_MARKER};
use std::collections::HashSet;

/// Represents the invariant violations the analyzer can report.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The input alphabet is empty or holds characters outside `[A-Za-z0-9]`.
    InvalidInputAlphabet(String),
    /// The tape alphabet lacks a required symbol or contains an illegal one.
    InvalidTapeAlphabet(String),
    /// A symbol or state appears more than once where a set is expected.
    Duplicates(String),
    /// `initialState` is absent.
    MissingInitialState,
    /// `initialState` is not one of `states`.
    UnknownInitialState(StateId),
    /// Final states that are not in `states`.
    UnknownFinalStates(Vec<StateId>),
    /// Transition rows keyed by a state that is unknown or final.
    InvalidTransitionStates(Vec<StateId>),
    /// Transition cells keyed by a symbol outside the tape alphabet.
    InvalidTransitionSymbols(Vec<(StateId, Symbol)>),
    /// A filled-in field holds a value outside its domain.
    InvalidCellValue {
        state: StateId,
        symbol: Symbol,
        detail: String,
    },
}

impl From<AnalysisError> for EditorError {
    /// Converts an `AnalysisError` into an `EditorError::InconsistentConfiguration`.
    fn from(error: AnalysisError) -> Self {
        let message = match error {
            AnalysisError::InvalidInputAlphabet(detail) => {
                format!("Invalid input alphabet: {}", detail)
            }
            AnalysisError::InvalidTapeAlphabet(detail) => {
                format!("Invalid tape alphabet: {}", detail)
            }
            AnalysisError::Duplicates(detail) => format!("Duplicate entries: {}", detail),
            AnalysisError::MissingInitialState => "Initial state is missing".to_string(),
            AnalysisError::UnknownInitialState(state) => {
                format!("Initial state '{}' is not a declared state", state)
            }
            AnalysisError::UnknownFinalStates(states) => {
                format!("Final states not declared as states: {:?}", states)
            }
            AnalysisError::InvalidTransitionStates(states) => format!(
                "Transitions defined for unknown or final states: {:?}",
                states
            ),
            AnalysisError::InvalidTransitionSymbols(cells) => format!(
                "Transitions read symbols outside the tape alphabet: {:?}",
                cells
            ),
            AnalysisError::InvalidCellValue {
                state,
                symbol,
                detail,
            } => format!("Transition ({}, {}): {}", state, symbol, detail),
        };
        EditorError::InconsistentConfiguration(message)
    }
}

/// Checks the structural invariants of a configuration: alphabets, state sets, and the
/// keys of the transition table.
///
/// Cell values are not inspected, so a model whose cells still point at a deleted state
/// or a removed symbol passes. Use `analyze_complete` before a configuration leaves the
/// editor.
///
/// # Returns
///
/// * `Ok(())` if no invariant is violated.
/// * `Err(EditorError::InconsistentConfiguration)` with the first failure otherwise.
pub fn analyze(config: &Configuration) -> Result<(), EditorError> {
    run_checks(
        config,
        &[
            check_input_alphabet,
            check_tape_alphabet,
            check_duplicates,
            check_initial_state,
            check_final_states,
            check_transition_keys,
        ],
    )
}

/// Runs `analyze` and then checks that every filled-in field holds a legal value.
///
/// Partially filled cells pass as long as the fields that are filled in are legal.
pub fn analyze_complete(config: &Configuration) -> Result<(), EditorError> {
    analyze(config)?;
    run_checks(config, &[check_cell_values])
}

type Check = fn(&Configuration) -> Result<(), AnalysisError>;

fn run_checks(config: &Configuration, checks: &[Check]) -> Result<(), EditorError> {
    let errors = checks
        .iter()
        .filter_map(|f| f(config).err())
        .collect::<Vec<_>>();

    if let Some(first_error) = errors.into_iter().next() {
        return Err(first_error.into());
    }

    Ok(())
}

fn check_input_alphabet(config: &Configuration) -> Result<(), AnalysisError> {
    let raw: String = config.input_alphabet.iter().collect();
    if !is_valid_alphabet(&raw) {
        return Err(AnalysisError::InvalidInputAlphabet(format!(
            "'{}' must be non-empty and alphanumeric",
            raw
        )));
    }

    Ok(())
}

/// The tape alphabet must hold every input symbol, the head marker, and the blank, and
/// nothing else that is not alphanumeric.
fn check_tape_alphabet(config: &Configuration) -> Result<(), AnalysisError> {
    let tape = &config.tape_alphabet;

    for required in [HEAD_MARKER, BLANK_SYMBOL] {
        if !tape.contains(&required) {
            return Err(AnalysisError::InvalidTapeAlphabet(format!(
                "missing reserved symbol '{}'",
                required
            )));
        }
    }

    let missing: Vec<Symbol> = config
        .input_alphabet
        .iter()
        .copied()
        .filter(|s| !tape.contains(s))
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::InvalidTapeAlphabet(format!(
            "input symbols {:?} are not tape symbols",
            missing
        )));
    }

    if let Some(bad) = tape
        .iter()
        .find(|s| !s.is_ascii_alphanumeric() && !is_reserved(**s))
    {
        return Err(AnalysisError::InvalidTapeAlphabet(format!(
            "illegal symbol '{}'",
            bad
        )));
    }

    Ok(())
}

fn check_duplicates(config: &Configuration) -> Result<(), AnalysisError> {
    fn first_repeat<T: Eq + std::hash::Hash + Clone>(items: &[T]) -> Option<T> {
        let mut seen = HashSet::new();
        items.iter().find(|item| !seen.insert(*item)).cloned()
    }

    if let Some(symbol) = first_repeat(&config.input_alphabet) {
        return Err(AnalysisError::Duplicates(format!(
            "input symbol '{}'",
            symbol
        )));
    }
    if let Some(symbol) = first_repeat(&config.tape_alphabet) {
        return Err(AnalysisError::Duplicates(format!("tape symbol '{}'", symbol)));
    }
    if let Some(state) = first_repeat(&config.states) {
        return Err(AnalysisError::Duplicates(format!("state '{}'", state)));
    }
    if let Some(state) = first_repeat(&config.final_states) {
        return Err(AnalysisError::Duplicates(format!("final state '{}'", state)));
    }

    Ok(())
}

/// The initial state must be present; it is never defaulted to the first listed state.
fn check_initial_state(config: &Configuration) -> Result<(), AnalysisError> {
    match &config.initial_state {
        None => Err(AnalysisError::MissingInitialState),
        Some(state) if !config.states.contains(state) => {
            Err(AnalysisError::UnknownInitialState(state.clone()))
        }
        Some(_) => Ok(()),
    }
}

fn check_final_states(config: &Configuration) -> Result<(), AnalysisError> {
    let unknown: Vec<StateId> = config
        .final_states
        .iter()
        .filter(|s| !config.states.contains(s))
        .cloned()
        .collect();

    if !unknown.is_empty() {
        return Err(AnalysisError::UnknownFinalStates(unknown));
    }

    Ok(())
}

/// Every row must belong to a declared, non-final state and every cell must read a tape
/// symbol.
fn check_transition_keys(config: &Configuration) -> Result<(), AnalysisError> {
    let mut invalid_states: Vec<StateId> = config
        .transitions
        .keys()
        .filter(|s| !config.states.contains(s) || config.final_states.contains(s))
        .cloned()
        .collect();

    if !invalid_states.is_empty() {
        invalid_states.sort();
        return Err(AnalysisError::InvalidTransitionStates(invalid_states));
    }

    let invalid_symbols: Vec<(StateId, Symbol)> = config
        .transitions
        .iter()
        .flat_map(|(state, cells)| cells.keys().map(move |&symbol| (state.clone(), symbol)))
        .filter(|(_, symbol)| !config.tape_alphabet.contains(symbol))
        .collect();

    if !invalid_symbols.is_empty() {
        return Err(AnalysisError::InvalidTransitionSymbols(invalid_symbols));
    }

    Ok(())
}

/// Filled-in fields must name a declared state, a single tape symbol, and a direction.
fn check_cell_values(config: &Configuration) -> Result<(), AnalysisError> {
    for (state, cells) in &config.transitions {
        for (&symbol, entry) in cells {
            let invalid = |detail: String| AnalysisError::InvalidCellValue {
                state: state.clone(),
                symbol,
                detail,
            };

            if !entry.next_state.is_empty() && !config.states.contains(&entry.next_state) {
                return Err(invalid(format!(
                    "next state '{}' is not a declared state",
                    entry.next_state
                )));
            }

            if !entry.write_symbol.is_empty() {
                let mut chars = entry.write_symbol.chars();
                let legal = match (chars.next(), chars.next()) {
                    (Some(c), None) => config.tape_alphabet.contains(&c),
                    _ => false,
                };
                if !legal {
                    return Err(invalid(format!(
                        "write symbol '{}' is not a tape symbol",
                        entry.write_symbol
                    )));
                }
            }

            if !entry.direction.is_empty() && entry.direction.parse::<Direction>().is_err() {
                return Err(invalid(format!(
                    "direction '{}' is not one of L, R, S",
                    entry.direction
                )));
            }
        }
    }

    Ok(())
}
