//! Integration tests for the sanity app layer
//!
//! Tests are organized by topic:
//! - `session_store` - Last and saved session persistence over raw storage
//! - `cli` - Command runner against in-memory storage and session files

mod session_store;

#[cfg(feature = "native")]
mod cli;
