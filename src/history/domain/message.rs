//! The chat message record held by a [`super::ChatHistory`].

use super::{MarkupError, MessageElement, Role, is_attribute_name};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form metadata attached to a message.
///
/// Keys are kept sorted so that serialised output is stable.
pub type Metadata = BTreeMap<String, Value>;

/// Attribute carrying the message role in the tagged form.
pub const ROLE_ATTRIBUTE: &str = "role";

/// Attribute carrying the optional encoding in the tagged form.
pub const ENCODING_ATTRIBUTE: &str = "encoding";

/// A single conversation turn.
///
/// Two messages are equal when their role, content, metadata and encoding
/// are all equal. Empty metadata is treated as absent and is omitted when
/// serialised.
///
/// # Examples
///
/// ```
/// use parley::history::domain::{ChatMessage, Role};
///
/// let message = ChatMessage::user("Hello!");
/// assert_eq!(message.role(), Role::User);
/// assert_eq!(message.to_prompt("message"), r#"<message role="user">Hello!</message>"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
}

impl ChatMessage {
    /// Creates a message with the given role and content.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            metadata: Metadata::new(),
            encoding: None,
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a tool message.
    #[must_use]
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }

    /// Replaces the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Adds a single metadata entry.
    #[must_use]
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Sets the encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the encoding, if any.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Converts the message into a tagged element named `root_key`.
    ///
    /// The role is always the first attribute, followed by the encoding and
    /// then any string-valued metadata entries. Metadata holding other JSON
    /// values has no attribute form and is left out, as are entries keyed
    /// `role` or `encoding` and keys that are not valid attribute names.
    #[must_use]
    pub fn to_element(&self, root_key: &str) -> MessageElement {
        let mut element =
            MessageElement::new(root_key).with_attribute(ROLE_ATTRIBUTE, self.role.as_str());
        if let Some(encoding) = &self.encoding {
            element = element.with_attribute(ENCODING_ATTRIBUTE, encoding.as_str());
        }
        for (key, value) in &self.metadata {
            let Value::String(text) = value else {
                continue;
            };
            if is_attribute_name(key) && key != ROLE_ATTRIBUTE && key != ENCODING_ATTRIBUTE {
                element = element.with_attribute(key.as_str(), text.as_str());
            }
        }
        element.with_text(self.content.as_str())
    }

    /// Renders the message in its tagged prompt form.
    #[must_use]
    pub fn to_prompt(&self, root_key: &str) -> String {
        self.to_element(root_key).render()
    }

    /// Builds a message from a parsed tagged element.
    ///
    /// The `role` attribute is required; `encoding` maps to the encoding and
    /// every other attribute becomes a string metadata entry.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::MalformedAttribute`] when the role attribute is
    /// missing or does not name a known role.
    pub fn from_element(element: &MessageElement) -> Result<Self, MarkupError> {
        let role_value = element.attribute(ROLE_ATTRIBUTE).ok_or_else(|| {
            MarkupError::MalformedAttribute(format!("missing {ROLE_ATTRIBUTE} attribute"))
        })?;
        let role = Role::try_from(role_value)
            .map_err(|err| MarkupError::MalformedAttribute(err.to_string()))?;

        let mut message = Self::new(role, element.text());
        for (key, value) in element.attributes() {
            match key {
                ROLE_ATTRIBUTE => {}
                ENCODING_ATTRIBUTE => message.encoding = Some(value.to_owned()),
                _ => {
                    message
                        .metadata
                        .insert(key.to_owned(), Value::String(value.to_owned()));
                }
            }
        }
        Ok(message)
    }
}
