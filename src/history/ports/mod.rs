//! Port interfaces for the chat history subsystem.
//!
//! Ports define the seams the segmenter and the persistence layer plug into.

pub mod record;
pub mod store;
