//! In-memory implementation of the `HistoryStore` port.
//!
//! Keeps the serialised JSON rather than the history itself, so saving and
//! loading exercise the same round trip as the file store.

use std::sync::{Arc, RwLock};

use crate::history::{
    adapters::json,
    config::SerializationConfig,
    domain::ChatHistory,
    error::StoreError,
    ports::store::{HistoryStore, StoreResult},
};

/// Thread-safe in-memory [`HistoryStore`].
///
/// Clones share the same slot.
///
/// # Example
///
/// ```
/// use parley::history::adapters::memory::InMemoryHistoryStore;
/// use parley::history::domain::ChatHistory;
/// use parley::history::ports::store::HistoryStore;
///
/// let store = InMemoryHistoryStore::new();
/// let history = ChatHistory::with_system_message("Be brief.");
/// store.save(&history).expect("save should succeed");
/// assert_eq!(store.load().expect("load should succeed"), history);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistoryStore {
    contents: Arc<RwLock<Option<String>>>,
    config: SerializationConfig,
}

impl InMemoryHistoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the JSON layout used when saving.
    #[must_use]
    pub fn with_config(mut self, config: SerializationConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the stored JSON text, if any.
    ///
    /// Returns `None` if the internal lock is poisoned.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().cloned())
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn save(&self, history: &ChatHistory) -> StoreResult<()> {
        let text = json::serialize(history, &self.config)?;
        let mut guard = self
            .contents
            .write()
            .map_err(|err| StoreError::unavailable(err.to_string()))?;
        *guard = Some(text);
        Ok(())
    }

    fn load(&self) -> StoreResult<ChatHistory> {
        let guard = self
            .contents
            .read()
            .map_err(|err| StoreError::unavailable(err.to_string()))?;
        let text = guard.as_deref().ok_or(StoreError::Missing)?;
        Ok(json::restore(text)?)
    }
}
