//! Durable signal store
//!
//! Persists the full per-symbol signal history as a JSON file keyed by
//! symbol. Both save and load are wholesale: save overwrites the file,
//! load replaces whatever was in memory.

use crate::error::{PipelineError, Result};
use crate::types::Signal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON-file backed store for signal history
pub struct SignalStore {
    path: PathBuf,
}

impl SignalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Overwrite the store with the given history
    pub async fn save(&self, history: &HashMap<String, Vec<Signal>>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PipelineError::Persistence(e.to_string()))?;
            }
        }

        let json = serde_json::to_string_pretty(history)
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;

        let total: usize = history.values().map(|v| v.len()).sum();
        info!("Saved {} signals to {}", total, self.path.display());
        Ok(())
    }

    /// Load the full history from disk
    pub async fn load(&self) -> Result<HashMap<String, Vec<Signal>>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        let history: HashMap<String, Vec<Signal>> = serde_json::from_str(&json)
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;

        let total: usize = history.values().map(|v| v.len()).sum();
        info!("Loaded {} signals from {}", total, self.path.display());
        Ok(history)
    }
}
