//! This crate provides the core of a Turing machine configuration editor.
//! It keeps the machine definition (alphabets, states, transition table) consistent while
//! it is edited, projects it into table and matrix views, converts it to the canonical
//! JSON document, and talks to the external engine that stores and runs machines.

pub mod alphabet;
pub mod analyzer;
pub mod codec;
pub mod editor;
pub mod engine;
pub mod loader;
pub mod matrix;
pub mod render;
pub mod samples;
pub mod states;
pub mod table;
pub mod transitions;
pub mod types;

/// Re-exports the alphabet normalization entry point and its result.
pub use alphabet::{normalize, Alphabets};
/// Re-exports the invariant checker and its detailed error.
pub use analyzer::{analyze, analyze_complete, AnalysisError};
/// Re-exports the configuration document and its codec functions.
pub use codec::{deserialize, serialize, to_json, Configuration};
/// Re-exports the editing context.
pub use editor::{Editor, SanitizedInput};
/// Re-exports the engine client.
pub use engine::{EngineClient, EngineError, EngineSettings, SaveOutcome, StoredFile};
/// Re-exports the `ConfigLoader` struct from the loader module.
pub use loader::ConfigLoader;
/// Re-exports the matrix projection.
pub use matrix::{project, Matrix};
/// Re-exports the execution result type and its renderer.
pub use render::{render, ExecutionResult, HistoryEntry};
/// Re-exports the embedded samples.
pub use samples::{SampleLibrary, SAMPLES};
/// Re-exports the state registry.
pub use states::StateRegistry;
/// Re-exports the table synchronizer and the editable table view.
pub use table::{reconcile, Reconciliation, TransitionTable};
/// Re-exports the transition store types.
pub use transitions::{TransitionEntry, TransitionStore};
/// Re-exports the shared types.
pub use types::{Direction, EditorError, Field, StateId, Symbol};
