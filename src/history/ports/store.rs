//! Persistence port for whole chat histories.
//!
//! A store holds exactly one serialised history. Saving replaces whatever
//! was stored before; loading restores the last saved history.

use crate::history::{domain::ChatHistory, error::StoreError};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Port for saving and loading a [`ChatHistory`].
///
/// Implementations must serialise before touching the underlying resource,
/// so a serialisation failure leaves previously stored data intact.
pub trait HistoryStore {
    /// Stores the history, replacing any earlier contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialisation or the write fails.
    fn save(&self, history: &ChatHistory) -> StoreResult<()>;

    /// Loads the stored history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails or the stored text cannot be
    /// restored.
    fn load(&self) -> StoreResult<ChatHistory>;
}
