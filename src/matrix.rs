//! Read-only state × symbol matrix derived from the transition store.
//!
//! The matrix is recomputed from scratch whenever it is needed and never written back.
//! Final states appear as rows even though they own no cells, so the grid is always
//! complete.

use crate::alphabet::display_order;
use crate::states::StateRegistry;
use crate::transitions::TransitionStore;
use crate::types::{Direction, StateId, Symbol, PLACEHOLDER};
use std::fmt;

/// Header of the corner cell in text output.
const CORNER: &str = "State \\ Symbol";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub state: StateId,
    pub label: String,
    pub is_initial: bool,
    pub is_final: bool,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    /// Column headers, head marker first.
    pub columns: Vec<Symbol>,
    pub rows: Vec<MatrixRow>,
}

/// Projects the store onto a full state × symbol grid.
///
/// Complete cells render as `(next, write, arrow)`; anything else renders as the
/// placeholder.
pub fn project(registry: &StateRegistry, tape: &[Symbol], store: &TransitionStore) -> Matrix {
    let columns = display_order(tape);

    let rows = registry
        .states()
        .iter()
        .map(|state| MatrixRow {
            state: state.clone(),
            label: registry.label(state),
            is_initial: registry.is_initial(state),
            is_final: registry.is_final(state),
            cells: columns
                .iter()
                .map(|&symbol| {
                    store
                        .get(state, symbol)
                        .filter(|entry| entry.is_complete())
                        .map(|entry| {
                            let movement = entry
                                .direction
                                .parse::<Direction>()
                                .map(|d| d.glyph().to_string())
                                .unwrap_or_else(|_| entry.direction.clone());
                            format!(
                                "({}, {}, {})",
                                entry.next_state, entry.write_symbol, movement
                            )
                        })
                        .unwrap_or_else(|| PLACEHOLDER.to_string())
                })
                .collect(),
        })
        .collect();

    Matrix { columns, rows }
}

impl Matrix {
    /// The rendered cell at (state, symbol), if both exist in the grid.
    pub fn cell(&self, state: &str, symbol: Symbol) -> Option<&str> {
        let column = self.columns.iter().position(|&s| s == symbol)?;
        self.rows
            .iter()
            .find(|row| row.state == state)
            .and_then(|row| row.cells.get(column))
            .map(String::as_str)
    }

    /// Number of cells holding a complete transition.
    pub fn filled(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.as_str() != PLACEHOLDER)
            .count()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = |s: &str| s.chars().count();

        let first = self
            .rows
            .iter()
            .map(|row| width(&row.label))
            .chain(std::iter::once(width(CORNER)))
            .max()
            .unwrap_or(0);

        let columns: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, _)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.cells.get(i))
                    .map(|cell| width(cell))
                    .chain(std::iter::once(1))
                    .max()
                    .unwrap_or(1)
            })
            .collect();

        let pad = |text: &str, to: usize| format!("{}{}", text, " ".repeat(to - width(text).min(to)));

        let mut header = pad(CORNER, first);
        for (symbol, &w) in self.columns.iter().zip(&columns) {
            header.push_str(" | ");
            header.push_str(&pad(&symbol.to_string(), w));
        }
        writeln!(f, "{}", header.trim_end())?;

        for row in &self.rows {
            let mut line = pad(&row.label, first);
            for (cell, &w) in row.cells.iter().zip(&columns) {
                line.push_str(" | ");
                line.push_str(&pad(cell, w));
            }
            writeln!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::normalize;
    use crate::table::reconcile;
    use crate::types::Field;

    #[test]
    fn test_binary_scenario() {
        let tape = normalize("01", "").unwrap().tape().to_vec();
        let mut registry = StateRegistry::new();
        let mut store = TransitionStore::new();
        registry.create_state(false);
        reconcile(&mut store, &registry, &tape);

        store.set_field("q0", '0', Field::NextState, "q1").unwrap();
        store.set_field("q0", '0', Field::WriteSymbol, "1").unwrap();
        store.set_field("q0", '0', Field::Direction, "R").unwrap();

        let matrix = project(&registry, &tape, &store);

        assert_eq!(matrix.columns, vec!['^', '0', '1', '_']);
        assert_eq!(matrix.cell("q0", '0'), Some("(q1, 1, →)"));
        assert_eq!(matrix.filled(), 1);
        assert_eq!(matrix.cell("q1", '1'), Some(PLACEHOLDER));
        assert_eq!(matrix.cell("q0", '^'), Some(PLACEHOLDER));
    }

    #[test]
    fn test_partial_cells_render_placeholder() {
        let tape = normalize("a", "").unwrap().tape().to_vec();
        let registry = StateRegistry::new();
        let mut store = TransitionStore::new();
        reconcile(&mut store, &registry, &tape);
        store.set_field("q0", 'a', Field::Direction, "L").unwrap();

        let matrix = project(&registry, &tape, &store);
        assert_eq!(matrix.cell("q0", 'a'), Some(PLACEHOLDER));
    }

    #[test]
    fn test_final_states_are_placeholder_rows() {
        let tape = normalize("a", "").unwrap().tape().to_vec();
        let mut registry = StateRegistry::new();
        registry.create_state(true);
        let mut store = TransitionStore::new();
        reconcile(&mut store, &registry, &tape);

        let matrix = project(&registry, &tape, &store);

        assert_eq!(matrix.rows.len(), 2);
        let final_row = &matrix.rows[1];
        assert!(final_row.is_final);
        assert_eq!(final_row.label, "q1 *");
        assert!(final_row.cells.iter().all(|c| c == PLACEHOLDER));
    }

    #[test]
    fn test_text_grid() {
        let tape = normalize("a", "").unwrap().tape().to_vec();
        let registry = StateRegistry::new();
        let mut store = TransitionStore::new();
        reconcile(&mut store, &registry, &tape);
        store.set_field("q0", 'a', Field::NextState, "q0").unwrap();
        store.set_field("q0", 'a', Field::WriteSymbol, "a").unwrap();
        store.set_field("q0", 'a', Field::Direction, "S").unwrap();

        let text = project(&registry, &tape, &store).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("State \\ Symbol | ^ | a"));
        assert!(lines[1].starts_with("→ q0"));
        assert!(lines[1].contains("(q0, a, •)"));
    }
}
