//! Best-score persistence boundary
//!
//! The simulation only knows the [`BestScoreStore`] contract. Features:
//! - JSON file store with atomic replace (tmp → save)
//! - In-memory store for tests and headless runs
//! - Failures are reported as [`PersistenceError`] and swallowed by the driver

mod file;

pub use file::JsonFileStore;

use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::rc::Rc;

use crate::highscores::BestScores;

/// Errors from loading or saving persisted data
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed data: {0}")]
    Format(#[from] serde_json::Error),
}

impl PersistenceError {
    /// True when the backing file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

/// Load/save contract for per-mode best scores
pub trait BestScoreStore {
    fn load(&mut self) -> Result<BestScores, PersistenceError>;
    fn save(&mut self, scores: &BestScores) -> Result<(), PersistenceError>;
}

impl<S: BestScoreStore + ?Sized> BestScoreStore for Box<S> {
    fn load(&mut self) -> Result<BestScores, PersistenceError> {
        (**self).load()
    }

    fn save(&mut self, scores: &BestScores) -> Result<(), PersistenceError> {
        (**self).save(scores)
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    scores: Option<BestScores>,
    saves: usize,
    fail_io: bool,
}

/// Shared in-memory store
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the driver persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with scores
    pub fn with_scores(scores: BestScores) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().scores = Some(scores);
        store
    }

    /// Store whose every operation fails with an IO error
    pub fn failing() -> Self {
        let store = Self::new();
        store.inner.borrow_mut().fail_io = true;
        store
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.inner.borrow().saves
    }

    /// Last saved (or seeded) scores
    pub fn scores(&self) -> Option<BestScores> {
        self.inner.borrow().scores.clone()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&mut self) -> Result<BestScores, PersistenceError> {
        let inner = self.inner.borrow();
        if inner.fail_io {
            return Err(io::Error::other("memory store configured to fail").into());
        }
        inner
            .scores
            .clone()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound).into())
    }

    fn save(&mut self, scores: &BestScores) -> Result<(), PersistenceError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_io {
            return Err(io::Error::other("memory store configured to fail").into());
        }
        inner.scores = Some(scores.clone());
        inner.saves += 1;
        Ok(())
    }
}

/// Write `contents` to `path` through a sibling temp file and rename
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameMode;

    #[test]
    fn test_memory_store_empty_is_not_found() {
        let mut store = MemoryStore::new();
        let err = store.load().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_memory_store_clones_share_slot() {
        let store = MemoryStore::new();
        let mut handle = store.clone();

        let mut scores = BestScores::default();
        scores.set(GameMode::Infrared, 9);
        handle.save(&scores).unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.scores().unwrap().get(GameMode::Infrared), 9);
    }

    #[test]
    fn test_failing_store() {
        let mut store = MemoryStore::failing();
        assert!(store.load().is_err());
        assert!(store.save(&BestScores::default()).is_err());
        assert_eq!(store.save_count(), 0);
    }
}
