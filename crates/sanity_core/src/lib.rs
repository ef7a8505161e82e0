//! Unit-aware formula engine for quick engineering sanity checks
//!
//! This crate evaluates arithmetic formulas over a table of named variables,
//! carrying physical units alongside the numbers. It supports:
//! - Live evaluation with unit propagation through `* / ^` and sum checks
//! - Expected-unit verification against the computed result
//! - One-dimensional parameter sweeps across a variable's range
//! - Monte Carlo uncertainty propagation (uniform and normal inputs)
//! - Session documents with JSON and YAML round-tripping
//!
//! # Example
//!
//! ```
//! use sanity_core::model::{LabSession, VariableEntry};
//!
//! let mut session = LabSession::new(
//!     "T * w",
//!     vec![
//!         VariableEntry::new("t", "T", 10.0).with_unit("N m").with_range(8.0, 12.0),
//!         VariableEntry::new("w", "w", 2.0).with_unit("rad/s").with_range(1.0, 3.0),
//!     ],
//! );
//! session.expected_unit = Some("W".into());
//!
//! let result = sanity_core::evaluate_formula(&session);
//! assert_eq!(result.value, Some(20.0));
//! assert_eq!(result.warnings.len(), 1);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod error;
pub mod expr;
pub mod monte_carlo;
pub mod stats;
pub mod sweep;
pub mod units;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{EvalError, FormulaError, SessionError};
pub use expr::{evaluate, evaluate_formula};
pub use model::{
    EngineWarning, EvaluateResult, LabSession, MonteCarloResult, SavedSession, SweepResult,
    VariableEntry,
};
pub use monte_carlo::{
    MonteCarloOptions, run_monte_carlo, run_monte_carlo_with_options, run_monte_carlo_with_rng,
};
pub use sweep::run_sweep;
