//! This module defines the shared constants and small types used throughout the editor:
//! the reserved tape symbols, head directions, the editable fields of a transition cell,
//! and the error type returned by every model operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The tape-head marker. Always part of the tape alphabet and listed first in headers.
pub const HEAD_MARKER: char = '^';
/// The blank symbol, denoting an unwritten tape cell.
pub const BLANK_SYMBOL: char = '_';
/// Prefix of generated state identifiers (`q0`, `q1`, ...).
pub const STATE_PREFIX: char = 'q';
/// Identifier of the initial state every machine starts with.
pub const INITIAL_STATE: &str = "q0";
/// Text shown for matrix cells that have no usable transition.
pub const PLACEHOLDER: &str = "-";

/// A state identifier such as `q3`.
pub type StateId = String;
/// A single tape symbol.
pub type Symbol = char;

/// Head movement after a transition fires.
///
/// On the wire a direction is the single letter `L`, `R` or `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left.
    #[serde(rename = "L")]
    Left,
    /// Move the head one cell to the right.
    #[serde(rename = "R")]
    Right,
    /// Keep the head where it is.
    #[serde(rename = "S")]
    Stay,
}

impl Direction {
    /// All directions, in the order an editor offers them.
    pub const ALL: [Direction; 3] = [Direction::Left, Direction::Right, Direction::Stay];

    /// The wire code (`L`, `R` or `S`).
    pub fn code(self) -> &'static str {
        match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "S",
        }
    }

    /// The arrow glyph used in the visualization matrix.
    pub fn glyph(self) -> char {
        match self {
            Direction::Left => '←',
            Direction::Right => '→',
            Direction::Stay => '•',
        }
    }
}

impl FromStr for Direction {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Direction::Left),
            "R" => Ok(Direction::Right),
            "S" => Ok(Direction::Stay),
            other => Err(EditorError::InconsistentConfiguration(format!(
                "invalid direction '{}', expected one of L, R, S",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One of the three editable fields of a transition cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The state the machine moves to.
    NextState,
    /// The symbol written under the head.
    WriteSymbol,
    /// The head movement.
    Direction,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::NextState => "next state",
            Field::WriteSymbol => "write symbol",
            Field::Direction => "direction",
        };
        f.write_str(name)
    }
}

/// Errors raised by the configuration model.
///
/// Every failing operation leaves the model exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The input alphabet is empty, or an alphabet contains characters outside `[A-Za-z0-9]`.
    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),
    /// Only the initial state is left; it can never be removed.
    #[error("Cannot delete the initial state {}", INITIAL_STATE)]
    CannotDeleteInitial,
    /// A cell edit referenced a (state, symbol) pair that is not in the current table.
    #[error("Unknown transition cell ({state}, {symbol})")]
    UnknownCell { state: StateId, symbol: Symbol },
    /// An operation needs the transition table, but no alphabet has been set yet.
    #[error("Transition table has not been generated; set the alphabets first")]
    TableNotGenerated,
    /// A configuration document is missing required fields or has the wrong shape.
    #[error("Malformed configuration: {0}")]
    MalformedConfiguration(String),
    /// A configuration document is well-formed but violates a model invariant.
    #[error("Inconsistent configuration: {0}")]
    InconsistentConfiguration(String),
    /// Reading or writing a configuration file failed.
    #[error("File error: {0}")]
    FileError(String),
}
