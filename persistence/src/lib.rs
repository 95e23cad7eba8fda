#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-effort persistence of the player's best score.
//!
//! [`BestScoreStore`] wraps any [`ScoreStorage`] backend and swallows every
//! storage failure: a read that fails reports no recorded best, and a write
//! that fails is skipped. Failures are logged at `warn` and never returned.

use std::{
    cell::RefCell,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by a score storage backend.
#[derive(Debug, Error)]
pub enum StorageFault {
    /// The backing file could not be read or written.
    #[error("score file {path} is inaccessible: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The backing file does not hold a valid score document.
    #[error("score file {path} is malformed: {source}")]
    Malformed {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The backend refused the operation.
    #[error("score storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable scalar storage for a single best score.
pub trait ScoreStorage {
    /// Loads the stored score, if any.
    fn load(&self) -> Result<Option<f64>, StorageFault>;

    /// Replaces the stored score.
    fn store(&mut self, score: f64) -> Result<(), StorageFault>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoreDocument {
    best_score: f64,
}

/// JSON file backend storing `{"best_score": <number>}`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates a backend that reads and writes the provided path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_fault(&self, source: std::io::Error) -> StorageFault {
        StorageFault::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ScoreStorage for FileStorage {
    fn load(&self) -> Result<Option<f64>, StorageFault> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_fault(error)),
        };
        let document: ScoreDocument =
            serde_json::from_str(&contents).map_err(|source| StorageFault::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(document.best_score))
    }

    fn store(&mut self, score: f64) -> Result<(), StorageFault> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| self.io_fault(error))?;
            }
        }
        let document = serde_json::to_string_pretty(&ScoreDocument { best_score: score })
            .map_err(|source| StorageFault::Malformed {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, document).map_err(|error| self.io_fault(error))
    }
}

/// In-memory backend. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<f64>>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with a score.
    #[must_use]
    pub fn with_score(score: f64) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(score))),
        }
    }

    /// Currently stored score.
    #[must_use]
    pub fn stored(&self) -> Option<f64> {
        *self.slot.borrow()
    }
}

impl ScoreStorage for MemoryStorage {
    fn load(&self) -> Result<Option<f64>, StorageFault> {
        Ok(*self.slot.borrow())
    }

    fn store(&mut self, score: f64) -> Result<(), StorageFault> {
        *self.slot.borrow_mut() = Some(score);
        Ok(())
    }
}

/// Best-score store that never surfaces storage failures.
#[derive(Debug)]
pub struct BestScoreStore<S> {
    storage: S,
}

impl<S: ScoreStorage> BestScoreStore<S> {
    /// Wraps a storage backend.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Provides read-only access to the backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Previously recorded best score, or `None` when absent or unreadable.
    #[must_use]
    pub fn read(&self) -> Option<f64> {
        match self.storage.load() {
            Ok(score) => score.filter(|score| score.is_finite()),
            Err(fault) => {
                tracing::warn!(%fault, "ignoring unreadable best score");
                None
            }
        }
    }

    /// Persists `score` when it beats the recorded best.
    ///
    /// Returns whether the score was written. An unreadable previous value
    /// counts as no recorded best.
    pub fn write(&mut self, score: f64) -> bool {
        if !score.is_finite() {
            return false;
        }
        if self.read().is_some_and(|best| best >= score) {
            return false;
        }

        match self.storage.store(score) {
            Ok(()) => {
                tracing::info!(score, "recorded new best score");
                true
            }
            Err(fault) => {
                tracing::warn!(%fault, "skipping best score write");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStorage;

    impl ScoreStorage for FailingStorage {
        fn load(&self) -> Result<Option<f64>, StorageFault> {
            Err(StorageFault::Unavailable("disk on fire".to_owned()))
        }

        fn store(&mut self, _score: f64) -> Result<(), StorageFault> {
            Err(StorageFault::Unavailable("disk on fire".to_owned()))
        }
    }

    #[test]
    fn failures_degrade_to_no_best() {
        let mut store = BestScoreStore::new(FailingStorage);
        assert_eq!(store.read(), None);
        assert!(!store.write(42.0));
    }

    #[test]
    fn only_higher_scores_are_written() {
        let mut store = BestScoreStore::new(MemoryStorage::new());
        assert!(store.write(10.0));
        assert!(!store.write(8.0));
        assert!(!store.write(10.0));
        assert!(store.write(12.5));
        assert_eq!(store.read(), Some(12.5));
    }

    #[test]
    fn memory_clones_share_a_slot() {
        let shared = MemoryStorage::with_score(3.0);
        let mut store = BestScoreStore::new(shared.clone());
        assert!(store.write(4.0));
        assert_eq!(shared.stored(), Some(4.0));
    }
}
