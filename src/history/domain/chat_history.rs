//! The ordered message log of a single conversation.

use super::{ChatMessage, DEFAULT_ROOT_KEY, Metadata};
use crate::history::error::{IndexOutOfBounds, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Index;

/// Input accepted by [`ChatHistory::add_message`].
///
/// Either a fully built message, or raw message fields that are validated
/// and turned into a message on insertion.
#[derive(Debug, Clone, PartialEq)]
pub enum AddMessage {
    /// A message that is appended unchanged.
    Record(ChatMessage),
    /// Raw fields (`role`, `content`, `metadata`, `encoding`).
    Raw(Map<String, Value>),
}

impl From<ChatMessage> for AddMessage {
    fn from(message: ChatMessage) -> Self {
        Self::Record(message)
    }
}

impl From<Map<String, Value>> for AddMessage {
    fn from(fields: Map<String, Value>) -> Self {
        Self::Raw(fields)
    }
}

/// An ordered log of chat messages.
///
/// Insertion order is the conversation turn order and is preserved by every
/// mutation and by serialisation. The log never reorders or deduplicates
/// its entries.
///
/// # Examples
///
/// ```
/// use parley::history::domain::{ChatHistory, Role};
///
/// let mut history = ChatHistory::with_system_message("You are terse.");
/// history.add_user_message("Hi");
/// history.add_assistant_message("Hello.");
///
/// assert_eq!(history.len(), 3);
/// assert_eq!(history.get(-1).map(|message| message.role()), Some(Role::Assistant));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Creates a history holding the given messages in order.
    #[must_use]
    pub const fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Creates a history whose only entry is a system message.
    ///
    /// An empty `content` yields an empty history.
    #[must_use]
    pub fn with_system_message(content: impl Into<String>) -> Self {
        Self::builder().with_system_message(content).build()
    }

    /// Starts building a history from messages and an optional system
    /// message.
    #[must_use]
    pub fn builder() -> ChatHistoryBuilder {
        ChatHistoryBuilder::default()
    }

    /// Inserts a message at the front of the history.
    pub fn prepend_message(&mut self, message: ChatMessage) {
        self.messages.insert(0, message);
    }

    /// Appends a system message.
    pub fn add_system_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::system(content));
    }

    /// Appends a user message.
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Appends an assistant message.
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Appends a tool message, attaching `metadata` when given.
    pub fn add_tool_message(&mut self, content: impl Into<String>, metadata: Option<Metadata>) {
        let message = ChatMessage::tool(content).with_metadata(metadata.unwrap_or_default());
        self.messages.push(message);
    }

    /// Appends a message built by the caller or described by raw fields.
    ///
    /// A [`AddMessage::Record`] is appended as-is and `encoding`/`metadata`
    /// are ignored. For [`AddMessage::Raw`], a non-empty `encoding` and
    /// `metadata` are merged into the fields before the message is built.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRole`] when raw fields have no
    /// `role` key, and [`ValidationError::InvalidFields`] when they do not
    /// describe a message. The history is unchanged on error.
    pub fn add_message(
        &mut self,
        message: impl Into<AddMessage>,
        encoding: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<(), ValidationError> {
        let mut fields = match message.into() {
            AddMessage::Record(record) => {
                self.messages.push(record);
                return Ok(());
            }
            AddMessage::Raw(fields) => fields,
        };

        if !fields.contains_key("role") {
            return Err(ValidationError::missing_role(&fields));
        }
        if let Some(value) = encoding.filter(|value| !value.is_empty()) {
            fields.insert("encoding".to_owned(), Value::String(value.to_owned()));
        }
        if let Some(entries) = metadata.filter(|entries| !entries.is_empty()) {
            fields.insert(
                "metadata".to_owned(),
                Value::Object(entries.into_iter().collect()),
            );
        }

        let record = serde_json::from_value::<ChatMessage>(Value::Object(fields))
            .map_err(|err| ValidationError::invalid_fields(err.to_string()))?;
        self.messages.push(record);
        Ok(())
    }

    /// Removes the first message equal to `message`.
    ///
    /// Returns `true` if a message was removed.
    pub fn remove_message(&mut self, message: &ChatMessage) -> bool {
        match self.messages.iter().position(|entry| entry == message) {
            Some(position) => {
                self.messages.remove(position);
                true
            }
            None => false,
        }
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the history holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the message at `index`. Negative indices count from the end,
    /// so `-1` is the most recent message.
    #[must_use]
    pub fn get(&self, index: isize) -> Option<&ChatMessage> {
        self.resolve(index)
            .and_then(|position| self.messages.get(position))
    }

    /// Like [`Self::get`], but reports out-of-range lookups as an error.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfBounds`] when `index` does not address a message.
    pub fn at(&self, index: isize) -> Result<&ChatMessage, IndexOutOfBounds> {
        self.get(index).ok_or(IndexOutOfBounds {
            index,
            len: self.len(),
        })
    }

    fn resolve(&self, index: isize) -> Option<usize> {
        if index >= 0 {
            usize::try_from(index).ok()
        } else {
            self.len().checked_sub(index.unsigned_abs())
        }
    }

    /// Returns `true` if an equal message is present.
    #[must_use]
    pub fn contains(&self, message: &ChatMessage) -> bool {
        self.messages.contains(message)
    }

    /// Iterates over the messages in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    /// Returns the messages as a slice.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Consumes the history, returning its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    /// Renders every message in tagged form, one per line.
    ///
    /// An empty history renders as the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.messages
            .iter()
            .map(|message| message.to_prompt(DEFAULT_ROOT_KEY))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ChatHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Index<usize> for ChatHistory {
    type Output = ChatMessage;

    #[expect(
        clippy::indexing_slicing,
        reason = "Index mirrors slice indexing and panics when out of bounds"
    )]
    fn index(&self, index: usize) -> &Self::Output {
        &self.messages[index]
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl IntoIterator for ChatHistory {
    type Item = ChatMessage;
    type IntoIter = std::vec::IntoIter<ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl FromIterator<ChatMessage> for ChatHistory {
    fn from_iter<I: IntoIterator<Item = ChatMessage>>(iter: I) -> Self {
        Self::from_messages(iter.into_iter().collect())
    }
}

impl Extend<ChatMessage> for ChatHistory {
    fn extend<I: IntoIterator<Item = ChatMessage>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

/// Builder for a [`ChatHistory`] seeded with messages and an optional
/// system message.
///
/// The system message is not retained on the history: it only becomes the
/// first entry.
///
/// # Examples
///
/// ```
/// use parley::history::domain::{ChatHistory, ChatMessage, Role};
///
/// let history = ChatHistory::builder()
///     .with_messages(vec![ChatMessage::user("Hi")])
///     .with_system_message("Be brief.")
///     .build();
///
/// assert_eq!(history[0].role(), Role::System);
/// assert_eq!(history[1].content(), "Hi");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatHistoryBuilder {
    messages: Vec<ChatMessage>,
    system_message: Option<String>,
}

impl ChatHistoryBuilder {
    /// Sets the initial messages.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Sets the system message to place before the initial messages.
    #[must_use]
    pub fn with_system_message(mut self, content: impl Into<String>) -> Self {
        self.system_message = Some(content.into());
        self
    }

    /// Builds the history. An empty system message is ignored.
    #[must_use]
    pub fn build(self) -> ChatHistory {
        let mut history = ChatHistory::from_messages(self.messages);
        if let Some(content) = self.system_message.filter(|content| !content.is_empty()) {
            history.prepend_message(ChatMessage::system(content));
        }
        history
    }
}
