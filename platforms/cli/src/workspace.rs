//! The local workspace file that carries the machine being edited from one command to the
//! next.

use std::path::{Path, PathBuf};
use tmedit::{serialize, ConfigLoader, Configuration, Editor, EditorError};

pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory used for local fallbacks: the one holding the workspace file.
    pub fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Reads and validates the workspace file.
    pub fn open(&self) -> Result<Editor, EditorError> {
        if !self.path.exists() {
            return Err(EditorError::FileError(format!(
                "No machine at {}; start one with `new` or `sample`",
                self.path.display()
            )));
        }
        Editor::adopt(ConfigLoader::load_file(&self.path)?)
    }

    /// Writes the editor back, mid-edit cells included.
    ///
    /// Nothing is written before the alphabets are set. Cell values are checked later by
    /// `Editor::export`, when the machine is saved or run.
    pub fn store(&self, editor: &Editor) -> Result<Configuration, EditorError> {
        editor.alphabets()?;
        let config = serialize(editor);
        ConfigLoader::save_file(&self.path, &config)?;
        Ok(config)
    }

    /// Applies `edit` to the stored machine and saves the result.
    pub fn update<T>(
        &self,
        edit: impl FnOnce(&mut Editor) -> Result<T, EditorError>,
    ) -> Result<(Editor, T), EditorError> {
        let mut editor = self.open()?;
        let outcome = edit(&mut editor)?;
        self.store(&editor)?;
        Ok((editor, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tmedit::Field;

    fn fresh(workspace: &Workspace) {
        let mut editor = Editor::new();
        editor.set_alphabets("01", "").unwrap();
        workspace.store(&editor).unwrap();
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("machine.json"));

        assert!(matches!(workspace.open(), Err(EditorError::FileError(_))));
    }

    #[test]
    fn test_update_persists() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("machine.json"));
        fresh(&workspace);

        let (_, state) = workspace.update(|editor| Ok(editor.add_state(false))).unwrap();
        assert_eq!(state, "q1");

        workspace
            .update(|editor| editor.set_field("q1", '0', Field::Direction, "L"))
            .unwrap();

        let editor = workspace.open().unwrap();
        assert_eq!(editor.registry().states().len(), 2);
        assert_eq!(editor.store().get("q1", '0').unwrap().direction, "L");
    }

    #[test]
    fn test_failed_update_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("machine.json"));
        fresh(&workspace);
        let before = std::fs::read_to_string(workspace.path()).unwrap();

        let result = workspace.update(|editor| editor.set_field("q9", '0', Field::NextState, "q0"));
        assert!(matches!(result, Err(EditorError::UnknownCell { .. })));
        assert!(workspace.update(|editor| editor.delete_last_state()).is_err());

        assert_eq!(std::fs::read_to_string(workspace.path()).unwrap(), before);
    }

    #[test]
    fn test_delete_state_still_referenced() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("machine.json"));
        fresh(&workspace);

        workspace.update(|editor| Ok(editor.add_state(false))).unwrap();
        workspace
            .update(|editor| editor.set_field("q0", '0', Field::NextState, "q1"))
            .unwrap();

        let (_, removed) = workspace.update(|editor| editor.delete_last_state()).unwrap();
        assert_eq!(removed, "q1");

        let editor = workspace.open().unwrap();
        assert_eq!(editor.registry().states(), &["q0".to_string()]);
        assert_eq!(editor.store().get("q0", '0').unwrap().next_state, "q1");
        assert!(editor.export().is_err());
    }

    #[test]
    fn test_shrinking_alphabet_keeps_written_symbol() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("machine.json"));
        let mut editor = Editor::new();
        editor.set_alphabets("01", "X").unwrap();
        workspace.store(&editor).unwrap();

        workspace
            .update(|editor| editor.set_field("q0", '0', Field::WriteSymbol, "X"))
            .unwrap();
        workspace
            .update(|editor| editor.set_alphabets("01", ""))
            .unwrap();

        let editor = workspace.open().unwrap();
        assert_eq!(editor.store().get("q0", '0').unwrap().write_symbol, "X");
    }

    #[test]
    fn test_store_requires_alphabets() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("machine.json"));

        assert_eq!(
            workspace.store(&Editor::new()).unwrap_err(),
            EditorError::TableNotGenerated
        );
        assert!(!workspace.path().exists());
    }

    #[test]
    fn test_directory_defaults_to_current() {
        assert_eq!(Workspace::new("machine.json").directory(), Path::new("."));
        assert_eq!(
            Workspace::new("/tmp/m/machine.json").directory(),
            Path::new("/tmp/m")
        );
    }
}
