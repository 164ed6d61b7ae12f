//! Adapter implementations for chat history persistence.
//!
//! - [`json`]: JSON rendering plus reader/writer persistence
//! - [`file`]: file-backed [`crate::history::ports::store::HistoryStore`]
//! - [`memory`]: in-memory store for tests and embedding

pub mod file;
pub mod json;
pub mod memory;
