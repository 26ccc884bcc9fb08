//! This module validates the user-supplied alphabets and derives the tape alphabet.
//!
//! The input alphabet and the auxiliary symbols are raw strings where each character is
//! one symbol. The tape alphabet is the de-duplicated union of both plus the reserved
//! head marker and blank symbol.

use crate::types::{EditorError, Symbol, BLANK_SYMBOL, HEAD_MARKER};
use serde::{Deserialize, Serialize};

/// The normalized alphabets of a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabets {
    input: Vec<Symbol>,
    tape: Vec<Symbol>,
}

impl Alphabets {
    /// Builds alphabets from already-normalized parts, e.g. from a loaded configuration.
    ///
    /// No validation happens here; loaded documents go through the analyzer first.
    pub fn from_parts(input: Vec<Symbol>, tape: Vec<Symbol>) -> Self {
        Self { input, tape }
    }

    /// Input alphabet in first-occurrence order.
    pub fn input(&self) -> &[Symbol] {
        &self.input
    }

    /// Tape alphabet in storage order (input, auxiliary, `^`, `_`).
    pub fn tape(&self) -> &[Symbol] {
        &self.tape
    }

    /// Tape alphabet in header order, with the head marker first.
    pub fn ordered_tape(&self) -> Vec<Symbol> {
        display_order(&self.tape)
    }

    /// The auxiliary symbols: tape symbols that are neither input nor reserved.
    pub fn auxiliary(&self) -> Vec<Symbol> {
        auxiliary_symbols(&self.input, &self.tape)
    }

    /// Whether `symbol` belongs to the input alphabet.
    pub fn accepts_input(&self, symbol: Symbol) -> bool {
        self.input.contains(&symbol)
    }
}

/// Validates and normalizes the raw alphabets.
///
/// # Arguments
///
/// * `input_raw` - The input alphabet, one symbol per character. Must be non-empty.
/// * `auxiliary_raw` - Extra working symbols. May be empty.
///
/// # Returns
///
/// * `Ok(Alphabets)` with duplicates removed in first-occurrence order.
/// * `Err(EditorError::InvalidAlphabet)` if either string has a character outside
///   `[A-Za-z0-9]`, or if the input alphabet is empty.
pub fn normalize(input_raw: &str, auxiliary_raw: &str) -> Result<Alphabets, EditorError> {
    if input_raw.is_empty() {
        return Err(EditorError::InvalidAlphabet(
            "input alphabet must not be empty".to_string(),
        ));
    }

    if !is_valid_alphabet(input_raw) {
        return Err(EditorError::InvalidAlphabet(format!(
            "input alphabet '{}' must contain only alphanumeric characters",
            input_raw
        )));
    }

    if !auxiliary_raw.is_empty() && !is_valid_alphabet(auxiliary_raw) {
        return Err(EditorError::InvalidAlphabet(format!(
            "auxiliary alphabet '{}' must contain only alphanumeric characters",
            auxiliary_raw
        )));
    }

    let input = dedup(input_raw.chars());
    let tape = dedup(
        input
            .iter()
            .copied()
            .chain(auxiliary_raw.chars())
            .chain([HEAD_MARKER, BLANK_SYMBOL]),
    );

    Ok(Alphabets { input, tape })
}

/// Checks that `raw` is non-empty and every character is an ASCII letter or digit.
pub fn is_valid_alphabet(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Whether `symbol` is one of the reserved tape symbols (`^` or `_`).
pub fn is_reserved(symbol: Symbol) -> bool {
    symbol == HEAD_MARKER || symbol == BLANK_SYMBOL
}

/// Returns the tape alphabet in header order: the head marker first, the rest unchanged.
pub fn display_order(tape: &[Symbol]) -> Vec<Symbol> {
    let mut ordered = Vec::with_capacity(tape.len());
    if tape.contains(&HEAD_MARKER) {
        ordered.push(HEAD_MARKER);
    }
    ordered.extend(tape.iter().copied().filter(|&s| s != HEAD_MARKER));
    ordered
}

/// Tape symbols that are neither in `input` nor reserved, in tape order.
pub fn auxiliary_symbols(input: &[Symbol], tape: &[Symbol]) -> Vec<Symbol> {
    tape.iter()
        .copied()
        .filter(|s| !input.contains(s) && !is_reserved(*s))
        .collect()
}

fn dedup(symbols: impl IntoIterator<Item = Symbol>) -> Vec<Symbol> {
    let mut seen = Vec::new();
    for symbol in symbols {
        if !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_binary_alphabet() {
        let alphabets = normalize("01", "").unwrap();

        assert_eq!(alphabets.input(), &['0', '1']);
        assert_eq!(alphabets.tape(), &['0', '1', '^', '_']);
        assert_eq!(alphabets.ordered_tape(), vec!['^', '0', '1', '_']);
        assert!(alphabets.auxiliary().is_empty());
    }

    #[test]
    fn test_duplicates_collapse_across_sources() {
        let alphabets = normalize("abba", "bXX").unwrap();

        assert_eq!(alphabets.input(), &['a', 'b']);
        assert_eq!(alphabets.tape(), &['a', 'b', 'X', '^', '_']);
        assert_eq!(alphabets.auxiliary(), vec!['X']);
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = normalize("", "X");
        assert!(matches!(result, Err(EditorError::InvalidAlphabet(_))));
    }

    #[test]
    fn test_invalid_characters_rejected() {
        assert!(matches!(
            normalize("0 1", ""),
            Err(EditorError::InvalidAlphabet(_))
        ));
        assert!(matches!(
            normalize("01", "^"),
            Err(EditorError::InvalidAlphabet(_))
        ));
        assert!(matches!(
            normalize("ä", ""),
            Err(EditorError::InvalidAlphabet(_))
        ));
    }

    #[test]
    fn test_display_order_moves_marker_first() {
        assert_eq!(display_order(&['a', '_', '^']), vec!['^', 'a', '_']);
        assert_eq!(display_order(&['a', 'b']), vec!['a', 'b']);
        assert!(display_order(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_input_alphabet_is_first_occurrence_dedup(raw in "[A-Za-z0-9]{1,24}") {
            let alphabets = normalize(&raw, "").unwrap();

            let mut expected: Vec<char> = Vec::new();
            for c in raw.chars() {
                if !expected.contains(&c) {
                    expected.push(c);
                }
            }
            prop_assert_eq!(alphabets.input(), expected.as_slice());
        }

        #[test]
        fn prop_reserved_symbols_present_once(
            raw in "[A-Za-z0-9]{1,12}",
            aux in "[A-Za-z0-9]{0,12}",
        ) {
            let alphabets = normalize(&raw, &aux).unwrap();
            let tape = alphabets.tape();

            prop_assert_eq!(tape.iter().filter(|&&s| s == HEAD_MARKER).count(), 1);
            prop_assert_eq!(tape.iter().filter(|&&s| s == BLANK_SYMBOL).count(), 1);
            prop_assert_eq!(alphabets.ordered_tape()[0], HEAD_MARKER);
        }
    }
}
