//! Embedded sample machines, decoded and validated once on first use.

use crate::codec::Configuration;
use crate::loader::ConfigLoader;
use crate::types::EditorError;
use tracing::warn;

// Default embedded machines
const SAMPLE_TEXTS: [&str; 3] = [
    include_str!("../machines/binary-increment.json"),
    include_str!("../machines/even-ones.json"),
    include_str!("../machines/anbn-marker.json"),
];

lazy_static::lazy_static! {
    pub static ref SAMPLES: Vec<Configuration> = SAMPLE_TEXTS
        .iter()
        .filter_map(|text| match ConfigLoader::load_str(text) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "skipping invalid sample machine");
                None
            }
        })
        .collect();
}

/// Turns a display name into its command-line form: `Binary increment` → `binary-increment`.
pub fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub struct SampleLibrary;

impl SampleLibrary {
    pub fn count() -> usize {
        SAMPLES.len()
    }

    pub fn by_index(index: usize) -> Result<Configuration, EditorError> {
        SAMPLES.get(index).cloned().ok_or_else(|| {
            EditorError::FileError(format!("Sample index {} out of range", index))
        })
    }

    /// Finds a sample by display name or slug, ignoring case.
    pub fn by_name(name: &str) -> Result<Configuration, EditorError> {
        let wanted = slug(name);
        SAMPLES
            .iter()
            .find(|config| config.name.as_deref().map(slug).as_deref() == Some(wanted.as_str()))
            .cloned()
            .ok_or_else(|| EditorError::FileError(format!("Sample '{}' not found", name)))
    }

    /// Slugs of all samples, in embedding order.
    pub fn names() -> Vec<String> {
        SAMPLES
            .iter()
            .filter_map(|config| config.name.as_deref().map(slug))
            .collect()
    }

    /// Indices of samples whose name or description mentions `query`.
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        SAMPLES
            .iter()
            .enumerate()
            .filter(|(_, config)| {
                [&config.name, &config.description]
                    .iter()
                    .filter_map(|field| field.as_deref())
                    .any(|text| text.to_lowercase().contains(&query))
            })
            .map(|(index, _)| index)
            .collect()
    }
}
