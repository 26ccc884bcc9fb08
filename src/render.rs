//! Text rendering of execution results returned by the engine.
//!
//! The engine owns the computation. This module only formats what it sends back, in the
//! order it was received and without dropping any history entry.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

const RULE: &str = "═══════════════════════════════════";

/// One recorded step of an engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: u64,
    pub state: String,
    pub position: i64,
    pub symbol: String,
    pub tape: String,
}

/// The engine's answer to an execute request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub accepted: bool,
    pub message: String,
    pub steps: u64,
    pub final_tape: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Formats a result as a header block followed by one block per history entry.
pub fn render(result: &ExecutionResult) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_result(&mut output, result);
    output
}

fn write_result(out: &mut impl Write, result: &ExecutionResult) -> fmt::Result {
    let status = if result.accepted {
        "✓ ACCEPTED"
    } else {
        "✗ REJECTED"
    };

    writeln!(out, "Status: {}", status)?;
    writeln!(out, "Message: {}", result.message)?;
    writeln!(out, "Steps executed: {}", result.steps)?;
    writeln!(out, "Final tape: {}", result.final_tape)?;

    if result.history.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Execution history:")?;
    writeln!(out, "{}", RULE)?;

    for entry in &result.history {
        writeln!(out)?;
        writeln!(out, "Step {}:", entry.step)?;
        writeln!(out, "  State: {}", entry.state)?;
        writeln!(out, "  Position: {}", entry.position)?;
        writeln!(out, "  Symbol: {}", entry.symbol)?;
        writeln!(out, "  Tape: {}", entry.tape)?;
    }

    Ok(())
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_result(f, self)
    }
}
