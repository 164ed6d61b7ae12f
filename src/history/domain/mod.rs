//! Domain types for the chat history subsystem.
//!
//! This module contains pure domain types with no infrastructure
//! dependencies: the message record, its tagged prompt form, and the ordered
//! log that owns a conversation's messages.

mod chat_history;
mod markup;
mod message;
mod role;

pub use chat_history::{AddMessage, ChatHistory, ChatHistoryBuilder};
pub use markup::{
    DEFAULT_ROOT_KEY, MarkupError, MessageElement, escape, is_attribute_name, unescape,
};
pub use message::{ChatMessage, ENCODING_ATTRIBUTE, Metadata, ROLE_ATTRIBUTE};
pub use role::{ParseRoleError, Role};
