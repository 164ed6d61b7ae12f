//! Record-type port used by the prompt segmenter.

use crate::history::domain::{ChatMessage, MarkupError, MessageElement, Role};

/// A message type the prompt segmenter can produce.
///
/// The segmenter builds plain-text turns through [`Self::from_plain_text`]
/// and tagged blocks through [`Self::from_element`]. A failure from the
/// latter is recovered by falling back to plain text.
pub trait PromptRecord: Sized {
    /// Builds a record from untagged text.
    fn from_plain_text(role: Role, content: &str) -> Self;

    /// Builds a record from a parsed tagged element.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError`] when the element does not describe a record.
    fn from_element(element: &MessageElement) -> Result<Self, MarkupError>;
}

impl PromptRecord for ChatMessage {
    fn from_plain_text(role: Role, content: &str) -> Self {
        Self::new(role, content)
    }

    fn from_element(element: &MessageElement) -> Result<Self, MarkupError> {
        Self::from_element(element)
    }
}
