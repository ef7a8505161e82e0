//! Formula evaluation with unit propagation.
//!
//! Formulas are arithmetic only: `+ - * / ^`, unary minus, parentheses,
//! numeric literals and symbol references. There are no function calls,
//! assignments or non-numeric types.
//!
//! Evaluation walks the parsed tree once, computing the numeric value and
//! the unit side by side. Units go through [`UnitExpr::combine`] at every
//! `*` and `/`; sums take the unit of their left operand and report a
//! disagreement with the right operand as a warning.
//!
//! ```
//! use sanity_core::expr::evaluate;
//! use sanity_core::model::VariableEntry;
//!
//! let vars = vec![
//!     VariableEntry::new("t", "T", 10.0).with_unit("N m"),
//!     VariableEntry::new("w", "w", 2.0).with_unit("rad/s"),
//! ];
//! let result = evaluate("T * w", &vars);
//! assert_eq!(result.value, Some(20.0));
//! assert_eq!(result.unit, "N m rad/s");
//! ```
//!
//! [`UnitExpr::combine`]: crate::units::UnitExpr::combine

mod eval;
mod lexer;
mod parser;

pub use eval::{
    Evaluation, EvaluationFailure, Formula, SymbolTable, check_expected_unit, compile_warnings,
};
pub use lexer::{Token, tokenize};
pub use parser::{BinaryOp, Expr, parse};

use crate::model::{EvaluateResult, LabSession, VariableEntry};

/// Evaluate `formula` against `variables` without an expected-unit check.
pub fn evaluate(formula: &str, variables: &[VariableEntry]) -> EvaluateResult {
    evaluate_with_expected(formula, variables, None)
}

/// Evaluate the session's formula for the live result panel.
///
/// Applies the session's `expectedUnit` check on success.
pub fn evaluate_formula(session: &LabSession) -> EvaluateResult {
    let result = evaluate_with_expected(
        &session.formula,
        &session.variables,
        session.expected_unit(),
    );
    tracing::trace!(
        formula = %session.formula,
        value = ?result.value,
        warnings = result.warnings.len(),
        "formula evaluated"
    );
    result
}

fn evaluate_with_expected(
    formula: &str,
    variables: &[VariableEntry],
    expected_unit: Option<&str>,
) -> EvaluateResult {
    match Formula::compile(formula) {
        Ok(compiled) => {
            let table = SymbolTable::from_variables(variables);
            compiled.evaluate_result(&table, expected_unit)
        }
        Err(e) => EvaluateResult::failure(e.to_string(), compile_warnings(&e)),
    }
}
