//! Unit tests for the history module.
//!
//! Tests are organised by domain concept, covering happy paths, error cases,
//! and edge cases for all public APIs.

mod markup_tests;
mod message_tests;
mod role_tests;
