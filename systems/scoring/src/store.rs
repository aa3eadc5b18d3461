//! Persistence capability used to remember the best score between sessions.

use std::{collections::HashMap, io};

use thiserror::Error;

/// Key/value storage for small unsigned counters such as the best score.
///
/// Implementations decide where values live; the scoring system only needs
/// to read a value once per run and write it back when a run beats it.
pub trait ScoreStore {
    /// Reads the value stored under `key`, or `None` when nothing was stored yet.
    fn get(&self, key: &str) -> Result<Option<u32>, ScoreStoreError>;

    /// Replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: u32) -> Result<(), ScoreStoreError>;
}

/// Failures reported by a [`ScoreStore`].
#[derive(Debug, Error)]
pub enum ScoreStoreError {
    /// The backing medium could not be read or written.
    #[error("score store I/O failed for `{key}`")]
    Io {
        /// Key being accessed when the failure occurred.
        key: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The stored value could not be interpreted as a score.
    #[error("stored value `{raw}` for `{key}` is not a valid score")]
    Malformed {
        /// Key whose value was malformed.
        key: String,
        /// Raw text found in the store.
        raw: String,
    },
}

/// Volatile store backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    values: HashMap<String, u32>,
}

impl MemoryScoreStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a single entry.
    #[must_use]
    pub fn with_value(key: &str, value: u32) -> Self {
        let mut values = HashMap::new();
        let _ = values.insert(key.to_owned(), value);
        Self { values }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self, key: &str) -> Result<Option<u32>, ScoreStoreError> {
        Ok(self.values.get(key).copied())
    }

    fn set(&mut self, key: &str, value: u32) -> Result<(), ScoreStoreError> {
        let _ = self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<u32>, ScoreStoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: u32) -> Result<(), ScoreStoreError> {
        (**self).set(key, value)
    }
}
