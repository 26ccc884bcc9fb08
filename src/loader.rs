//! This module provides the `ConfigLoader` struct, responsible for reading and writing
//! machine configurations on the local disk.
//!
//! Files read here are treated as untrusted: they are decoded and then checked against
//! the structural model invariants before being returned.

use crate::analyzer::analyze;
use crate::codec::{deserialize, to_json, Configuration};
use crate::types::EditorError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension used for saved configurations.
pub const CONFIG_EXTENSION: &str = "json";

/// `ConfigLoader` is a utility struct for loading and saving configurations.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates a configuration from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Configuration)` if the file is read, decoded, and consistent.
    /// * `Err(EditorError::FileError)` if the file cannot be read.
    /// * `Err(EditorError::MalformedConfiguration)` if the content has the wrong shape.
    /// * `Err(EditorError::InconsistentConfiguration)` if an invariant is violated.
    pub fn load_file(path: &Path) -> Result<Configuration, EditorError> {
        let content = fs::read_to_string(path).map_err(|e| {
            EditorError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), bytes = content.len(), "read configuration file");
        Self::load_str(&content)
    }

    /// Loads and validates a configuration from JSON text, e.g. piped from stdin.
    pub fn load_str(content: &str) -> Result<Configuration, EditorError> {
        let config = deserialize(content)?;
        analyze(&config)?;
        Ok(config)
    }

    /// Writes a configuration as pretty JSON, replacing any existing file.
    pub fn save_file(path: &Path, config: &Configuration) -> Result<(), EditorError> {
        let json = to_json(config)?;
        fs::write(path, json).map_err(|e| {
            EditorError::FileError(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "wrote configuration file");
        Ok(())
    }

    /// The path `<directory>/<name>.json`.
    pub fn path_for(directory: &Path, name: &str) -> PathBuf {
        directory.join(format!("{}.{}", name, CONFIG_EXTENSION))
    }

    /// Loads every `.json` configuration in a directory.
    ///
    /// Directories and files with other extensions are skipped. Each element of the
    /// result is either the loaded configuration with its path, or the error for one file.
    pub fn load_dir(directory: &Path) -> Vec<Result<(PathBuf, Configuration), EditorError>> {
        if !directory.exists() {
            return vec![Err(EditorError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(EditorError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(EditorError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir() || path.extension().is_none_or(|ext| ext != CONFIG_EXTENSION) {
                    return None;
                }

                Some(Self::load_file(&path).map(|config| (path, config)))
            })
            .collect();

        results.sort_by(|a, b| match (a, b) {
            (Ok((pa, _)), Ok((pb, _))) => pa.cmp(pb),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });
        results
    }
}
