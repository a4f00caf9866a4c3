//! Result artifact persistence
//!
//! Provides a `ResultStore` that writes the full set of location summaries of
//! a run to a JSON file, replacing whatever a previous run left there.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::LocationSummary;

/// Default artifact file name, relative to the working directory
pub const DEFAULT_RESULT_PATH: &str = "result.json";

/// Errors that can occur when reading or writing the artifact
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Summaries could not be encoded or decoded
    #[error("Invalid result data in {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and writes the result artifact
#[derive(Debug, Clone)]
pub struct ResultStore {
    /// Location of the artifact
    path: PathBuf,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_PATH)
    }
}

impl ResultStore {
    /// Creates a store writing to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Ensures the directory holding the artifact exists
    fn ensure_dir(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))
            }
            _ => Ok(()),
        }
    }

    /// Writes the complete set of summaries as one pretty-printed JSON array
    ///
    /// Any existing artifact at the path is overwritten.
    pub fn save(&self, summaries: &[LocationSummary]) -> Result<(), StoreError> {
        self.ensure_dir()?;

        let json =
            serde_json::to_string_pretty(summaries).map_err(|source| StoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    /// Reads the summaries back from the artifact
    pub fn load(&self) -> Result<Vec<LocationSummary>, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;

        serde_json::from_str(&content).map_err(|source| StoreError::Serialize {
            path: self.path.clone(),
            source,
        })
    }
}
