//! Parley: ordered chat history with rendered-prompt segmentation.
//!
//! This crate keeps the message log of a dialogue-driven application and can
//! rebuild that log from a flattened prompt string in which turns appear as
//! `<message role="...">` blocks.
//!
//! # Architecture
//!
//! Parley follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types with no infrastructure dependencies
//! - **Ports**: Trait seams for record construction and persistence
//! - **Adapters**: JSON, file and in-memory persistence
//!
//! # Modules
//!
//! - [`history`]: Chat history log, prompt segmenter and persistence

pub mod history;
