//! Persisted table artifacts.
//!
//! A fresh successful build saves the assembled table as pretty-printed JSON
//! under the data directory; when every build attempt fails, the runner loads
//! the last saved artifact instead. Keys map to `<data_dir>/<key>.json`.

use std::fs::{self, File};
use std::path::PathBuf;

use crate::domain::AssembledTable;
use crate::error::PipelineError;

pub struct TableStore {
    root: PathBuf,
}

impl TableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Save `table` under `key`, creating the data directory if needed.
    pub fn save(&self, key: &str, table: &AssembledTable) -> Result<PathBuf, PipelineError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            PipelineError::Persistence(format!(
                "failed to create data directory '{}': {e}",
                self.root.display()
            ))
        })?;

        let path = self.path_for(key);
        let file = File::create(&path).map_err(|e| {
            PipelineError::Persistence(format!("failed to create '{}': {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(file, table).map_err(|e| {
            PipelineError::Persistence(format!("failed to write '{}': {e}", path.display()))
        })?;
        Ok(path)
    }

    /// Load the table saved under `key`.
    ///
    /// A missing artifact is `NotFound`, so the runner can distinguish "no
    /// fallback exists" from a corrupt one.
    pub fn load(&self, key: &str) -> Result<AssembledTable, PipelineError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(PipelineError::NotFound(format!(
                "no saved table at '{}'",
                path.display()
            )));
        }
        let file = File::open(&path).map_err(|e| {
            PipelineError::Persistence(format!("failed to open '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(file).map_err(|e| {
            PipelineError::Persistence(format!("invalid table artifact '{}': {e}", path.display()))
        })
    }
}
