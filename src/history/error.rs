//! Error types for chat history mutation, segmentation and persistence.
//!
//! Uses `thiserror` for typed variants that callers can match on.

use super::domain::MarkupError;
use serde_json::error::Category;
use thiserror::Error;

/// Errors raised when caller input cannot form a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Raw message fields were supplied without a `role` key.
    #[error("message fields must contain at least the role, got: {fields}")]
    MissingRole {
        /// The offending fields rendered as JSON.
        fields: String,
    },

    /// Raw message fields do not describe a valid message.
    #[error("invalid message fields: {0}")]
    InvalidFields(String),
}

impl ValidationError {
    /// Creates a missing-role error from the rejected fields.
    #[must_use]
    pub fn missing_role(fields: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self::MissingRole {
            fields: serde_json::Value::Object(fields.clone()).to_string(),
        }
    }

    /// Creates an invalid-fields error.
    #[must_use]
    pub fn invalid_fields(reason: impl Into<String>) -> Self {
        Self::InvalidFields(reason.into())
    }
}

/// A position-based lookup fell outside the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("message index {index} out of range for history of length {len}")]
pub struct IndexOutOfBounds {
    /// The requested index, possibly negative.
    pub index: isize,
    /// The history length at the time of the lookup.
    pub len: usize,
}

/// A tagged fragment that could not be read and was kept as literal text.
///
/// Recoveries are not errors: segmentation continues after recording one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecoveryWarning {
    /// The raw fragment, tag markers included.
    pub fragment: String,
    /// Why the fragment could not be read.
    pub error: MarkupError,
}

impl std::fmt::Display for ParseRecoveryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unable to parse message fragment ({}), kept as content: {}",
            self.error, self.fragment
        )
    }
}

/// The history could not be rendered as JSON.
#[derive(Debug, Error)]
#[error("unable to serialise chat history to JSON: {0}")]
pub struct SerializationError(#[from] pub serde_json::Error);

/// JSON text could not be turned back into a history.
#[derive(Debug, Error)]
pub enum DeserializationError {
    /// The text is not well-formed JSON.
    #[error("invalid JSON format: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The text ended before the JSON value was complete.
    #[error("unexpected end of JSON input: {0}")]
    Eof(#[source] serde_json::Error),

    /// The JSON is well-formed but does not describe a chat history.
    #[error("JSON does not describe a chat history: {0}")]
    Schema(#[source] serde_json::Error),

    /// The underlying reader failed while the JSON was being decoded.
    #[error("I/O failure while decoding JSON: {0}")]
    Io(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Syntax => Self::Syntax(err),
            Category::Eof => Self::Eof(err),
            Category::Data => Self::Schema(err),
            Category::Io => Self::Io(err),
        }
    }
}

/// Errors raised while storing or loading a history through a resource.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading from or writing to the resource failed.
    #[error("history resource I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The history could not be serialised; nothing was written.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The stored text could not be restored.
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// Nothing has been stored yet.
    #[error("no chat history has been stored")]
    Missing,

    /// The store cannot currently be accessed.
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates an unavailable-store error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}
