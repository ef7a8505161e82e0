//! Sanity: quick engineering sanity checks with unit-aware formulas
//!
//! This crate wraps the `sanity_core` engine with everything a front end
//! needs around it:
//! - Session persistence (last working session and a capped saved list)
//! - A Monte Carlo shell that runs off the interactive path
//! - Platform backends for native (files, threads) and web (localStorage)
//! - A command-line front end and plain-text reports
//!
//! Compile with the `native` feature for the CLI or `web` for the WASM build.

// ============================================================================
// Platform and persistence
// ============================================================================

pub mod logging;
pub mod platform;
pub mod session_store;

// ============================================================================
// Execution and presentation
// ============================================================================

pub mod report;
pub mod shell;

// ============================================================================
// Front ends
// ============================================================================

#[cfg(feature = "native")]
pub mod cli;

#[cfg(feature = "web")]
pub mod web;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use session_store::{SessionStore, generate_session_id};
pub use shell::{MonteCarloShell, MonteCarloStatus};

#[cfg(feature = "native")]
pub use logging::init_logging;

#[cfg(feature = "web")]
pub use logging::init_logging_web;
