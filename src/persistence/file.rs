//! JSON file backed best-score store

use std::path::{Path, PathBuf};

use super::{BestScoreStore, PersistenceError, write_atomic};
use crate::highscores::BestScores;

/// Best scores kept as a small JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&mut self) -> Result<BestScores, PersistenceError> {
        let json = std::fs::read_to_string(&self.path)?;
        let scores: BestScores = serde_json::from_str(&json)?;
        log::info!("Loaded best scores from {}", self.path.display());
        Ok(scores)
    }

    fn save(&mut self, scores: &BestScores) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(scores)?;
        write_atomic(&self.path, &json)?;
        log::info!("Best scores saved to {}", self.path.display());
        Ok(())
    }
}
