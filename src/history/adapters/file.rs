//! File-backed implementation of the `HistoryStore` port.
//!
//! The parent directory is opened once through `cap-std`; every save or load
//! opens the file, performs exactly one full write or read, and closes it
//! before returning. Saves overwrite the file in place with no locking.

use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use crate::history::{
    adapters::json,
    config::SerializationConfig,
    domain::ChatHistory,
    error::StoreError,
    ports::store::{HistoryStore, StoreResult},
};

/// Stores a single chat history as a JSON file.
///
/// # Example
///
/// ```no_run
/// use parley::history::adapters::file::FileHistoryStore;
/// use parley::history::domain::ChatHistory;
/// use parley::history::ports::store::HistoryStore;
///
/// let store = FileHistoryStore::open("conversation.json")?;
/// let mut history = ChatHistory::new();
/// history.add_user_message("Hi");
/// store.save(&history)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FileHistoryStore {
    dir: Dir,
    file_name: String,
    path: Utf8PathBuf,
    config: SerializationConfig,
}

impl fmt::Debug for FileHistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHistoryStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FileHistoryStore {
    /// Opens a store for the file at `path`.
    ///
    /// The parent directory must exist; the file itself need not.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `path` has no file name or its parent
    /// directory cannot be opened.
    pub fn open(path: impl AsRef<Utf8Path>) -> io::Result<Self> {
        let file_path = path.as_ref();
        let file_name = file_path
            .file_name()
            .ok_or_else(|| io::Error::other("path must include a file name"))?;
        let parent = file_path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        Ok(Self::in_dir(dir, file_name).with_path(file_path))
    }

    /// Creates a store for `file_name` inside an already opened directory.
    #[must_use]
    pub fn in_dir(dir: Dir, file_name: impl Into<String>) -> Self {
        let name = file_name.into();
        Self {
            dir,
            path: Utf8PathBuf::from(name.as_str()),
            file_name: name,
            config: SerializationConfig::default(),
        }
    }

    /// Sets the JSON layout used when saving.
    #[must_use]
    pub fn with_config(mut self, config: SerializationConfig) -> Self {
        self.config = config;
        self
    }

    fn with_path(mut self, path: &Utf8Path) -> Self {
        self.path = path.to_owned();
        self
    }

    /// Returns the path the store was opened with.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn save(&self, history: &ChatHistory) -> StoreResult<()> {
        let text = json::serialize(history, &self.config)?;
        self.dir.write(&self.file_name, text)?;
        debug!(path = %self.path, messages = history.len(), "stored chat history");
        Ok(())
    }

    fn load(&self) -> StoreResult<ChatHistory> {
        let text = self.dir.read_to_string(&self.file_name)?;
        let history = json::restore(&text)?;
        debug!(path = %self.path, messages = history.len(), "loaded chat history");
        Ok(history)
    }
}

impl ChatHistory {
    /// Writes the history to the file at `path`, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialisation fails or the file cannot be
    /// written. A serialisation failure leaves the file untouched.
    pub fn store_to_file(&self, path: impl AsRef<Utf8Path>) -> Result<(), StoreError> {
        FileHistoryStore::open(path)?.save(self)
    }

    /// Loads a history from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read or restored.
    pub fn load_from_file(path: impl AsRef<Utf8Path>) -> Result<Self, StoreError> {
        FileHistoryStore::open(path)?.load()
    }
}
