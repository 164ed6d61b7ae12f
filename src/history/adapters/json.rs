//! JSON rendering of chat histories and reader/writer persistence.
//!
//! The persisted form is an object with a `messages` array; each message
//! carries `role` and `content`, plus `metadata` and `encoding` when set:
//!
//! ```json
//! {
//!     "messages": [
//!         { "role": "user", "content": "Hi", "encoding": "utf-8" }
//!     ]
//! }
//! ```

use crate::history::{
    config::SerializationConfig,
    domain::ChatHistory,
    error::{DeserializationError, SerializationError, StoreError},
};
use serde_json::ser::PrettyFormatter;
use std::io::{Read, Write};

/// Renders `history` as JSON.
///
/// # Errors
///
/// Returns [`SerializationError`] if a message cannot be represented.
pub fn serialize(
    history: &ChatHistory,
    config: &SerializationConfig,
) -> Result<String, SerializationError> {
    if config.indent_width == 0 {
        return Ok(serde_json::to_string(history)?);
    }

    let indent = " ".repeat(config.indent_width);
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut buffer,
        PrettyFormatter::with_indent(indent.as_bytes()),
    );
    serde::Serialize::serialize(history, &mut serializer)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Restores a history from JSON text.
///
/// # Errors
///
/// Returns [`DeserializationError`] when the text is not well-formed JSON or
/// does not describe a chat history.
pub fn restore(text: &str) -> Result<ChatHistory, DeserializationError> {
    Ok(serde_json::from_str(text)?)
}

/// Serialises `history` and writes the full text to `writer`.
///
/// Nothing is written if serialisation fails.
///
/// # Errors
///
/// Returns [`StoreError`] if serialisation, the write, or the flush fails.
pub fn write_history<W: Write>(
    history: &ChatHistory,
    mut writer: W,
    config: &SerializationConfig,
) -> Result<(), StoreError> {
    let json = serialize(history, config)?;
    writer.write_all(json.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Reads `reader` to the end and restores the history it holds.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the read fails and
/// [`StoreError::Deserialization`] if the text cannot be restored.
pub fn read_history<R: Read>(mut reader: R) -> Result<ChatHistory, StoreError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(restore(&text)?)
}

impl ChatHistory {
    /// Renders the history as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if a message cannot be represented.
    pub fn serialize(&self) -> Result<String, SerializationError> {
        serialize(self, &SerializationConfig::default())
    }

    /// Restores a history from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializationError`] when the text is malformed or does
    /// not describe a chat history.
    pub fn restore(text: &str) -> Result<Self, DeserializationError> {
        restore(text)
    }

    /// Writes the indented JSON form of the history to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialisation or the write fails.
    pub fn store_to<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        write_history(self, writer, &SerializationConfig::default())
    }

    /// Reads a history from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails or the text cannot be
    /// restored.
    pub fn load_from<R: Read>(reader: R) -> Result<Self, StoreError> {
        read_history(reader)
    }
}
