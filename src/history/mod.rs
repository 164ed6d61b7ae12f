//! Chat history log, rendered-prompt segmentation and persistence.
//!
//! # Architecture
//!
//! - **Domain**: [`domain::ChatHistory`], [`domain::ChatMessage`], [`domain::Role`]
//!   and the tagged element form [`domain::MessageElement`]
//! - **Services**: [`services::PromptSegmenter`] turning rendered prompts into messages
//! - **Ports**: [`ports::record::PromptRecord`], [`ports::store::HistoryStore`]
//! - **Adapters**: JSON, file and in-memory persistence
//!
//! # Example
//!
//! ```
//! use parley::history::domain::{ChatHistory, Role};
//!
//! let history = ChatHistory::from_rendered_prompt(
//!     r#"You are helpful.<message role="user">What is Rust?</message>"#,
//! );
//! assert_eq!(history.len(), 2);
//! assert_eq!(history[1].role(), Role::User);
//!
//! let json = history.serialize().expect("history should serialise");
//! assert_eq!(ChatHistory::restore(&json).expect("json should restore"), history);
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
