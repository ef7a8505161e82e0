//! Lockstep numeric and unit evaluation of a parsed formula.

use rustc_hash::FxHashMap;

use super::lexer::tokenize;
use super::parser::{BinaryOp, Expr, parse};
use crate::error::{EvalError, FormulaError};
use crate::model::{EngineWarning, EvaluateResult, VariableEntry, VariableId};
use crate::units::{DIMENSIONLESS, UnitExpr, UnitOp};

/// A symbol's value and unit during evaluation
#[derive(Debug, Clone)]
struct Binding {
    value: f64,
    unit: UnitExpr,
    owner: VariableId,
}

/// Symbol → (value, unit) lookup built from a variable table.
///
/// When several variables share a symbol the first one in table order wins.
/// Unit labels are parsed once here, so repeated evaluation only pays for
/// value substitution.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    bindings: FxHashMap<String, Binding>,
}

impl SymbolTable {
    pub fn from_variables(variables: &[VariableEntry]) -> Self {
        let mut bindings = FxHashMap::default();
        for variable in variables {
            bindings
                .entry(variable.symbol.trim().to_string())
                .or_insert_with(|| Binding {
                    value: variable.value,
                    unit: UnitExpr::parse(&variable.unit),
                    owner: variable.id.clone(),
                });
        }
        Self { bindings }
    }

    /// Substitute a new value for `variable`. Returns false when the
    /// variable's symbol is shadowed by an earlier entry.
    pub fn set_value(&mut self, variable: &VariableEntry, value: f64) -> bool {
        match self.bindings.get_mut(variable.symbol.trim()) {
            Some(binding) if binding.owner == variable.id => {
                binding.value = value;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.bindings.contains_key(symbol)
    }

    fn get(&self, symbol: &str) -> Option<&Binding> {
        self.bindings.get(symbol)
    }
}

/// Successful evaluation: value, unit and any warnings raised on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub unit: UnitExpr,
    pub warnings: Vec<EngineWarning>,
}

/// Failed evaluation, still carrying the warnings that explain it
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationFailure {
    pub error: EvalError,
    pub warnings: Vec<EngineWarning>,
}

/// A parsed formula, ready to be evaluated against many symbol tables
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
    symbols: Vec<String>,
}

impl Formula {
    /// Parse a formula once
    pub fn compile(source: &str) -> Result<Self, FormulaError> {
        if source.trim().is_empty() {
            return Err(FormulaError::Empty);
        }
        let tokens = tokenize(source)?;
        let expr = parse(&tokens)?;
        let mut symbols = Vec::new();
        collect_symbols(&expr, &mut symbols);
        Ok(Self {
            source: source.to_string(),
            expr,
            symbols,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct symbols referenced, in order of first appearance
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Evaluate value and unit together.
    ///
    /// Unknown symbols fail the evaluation with one `missing-variable`
    /// warning per symbol. Unit disagreements inside the expression are
    /// warnings only.
    pub fn evaluate(&self, table: &SymbolTable) -> Result<Evaluation, EvaluationFailure> {
        let missing: Vec<&String> = self
            .symbols
            .iter()
            .filter(|s| !table.contains(s))
            .collect();
        if let Some(first) = missing.first() {
            return Err(EvaluationFailure {
                error: EvalError::UnknownSymbol(first.to_string()),
                warnings: missing
                    .iter()
                    .map(|s| EngineWarning::MissingVariable {
                        symbol: s.to_string(),
                    })
                    .collect(),
            });
        }

        let mut warnings = Vec::new();
        let (value, unit) = eval_node(&self.expr, table, &mut warnings);
        if !value.is_finite() {
            return Err(EvaluationFailure {
                error: EvalError::NonFinite,
                warnings,
            });
        }
        Ok(Evaluation {
            value,
            unit,
            warnings,
        })
    }

    /// Evaluate and package as an [`EvaluateResult`], checking the computed
    /// unit against `expected_unit` when one is given.
    pub fn evaluate_result(
        &self,
        table: &SymbolTable,
        expected_unit: Option<&str>,
    ) -> EvaluateResult {
        match self.evaluate(table) {
            Ok(mut evaluation) => {
                if let Some(expected) = expected_unit {
                    if let Some(warning) = check_expected_unit(expected, &evaluation.unit) {
                        evaluation.warnings.push(warning);
                    }
                }
                EvaluateResult::success(
                    evaluation.value,
                    evaluation.unit.label(),
                    evaluation.warnings,
                )
            }
            Err(failure) => EvaluateResult::failure(failure.error.to_string(), failure.warnings),
        }
    }
}

/// Compare a user-claimed unit against the computed one.
pub fn check_expected_unit(expected: &str, actual: &UnitExpr) -> Option<EngineWarning> {
    let expected = expected.trim();
    if expected.is_empty() || UnitExpr::parse(expected).equals_structurally(actual) {
        return None;
    }
    Some(EngineWarning::UnitMismatch {
        expected: expected.to_string(),
        actual: actual.display_label(),
    })
}

/// Warnings for a formula that failed to compile
pub fn compile_warnings(error: &FormulaError) -> Vec<EngineWarning> {
    match error {
        FormulaError::Empty => Vec::new(),
        other => vec![EngineWarning::InvalidFormula {
            message: other.to_string(),
        }],
    }
}

fn collect_symbols(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Symbol(name) => {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        Expr::Neg(inner) => collect_symbols(inner, out),
        Expr::Binary { left, right, .. } => {
            collect_symbols(left, out);
            collect_symbols(right, out);
        }
    }
}

fn eval_node(expr: &Expr, table: &SymbolTable, warnings: &mut Vec<EngineWarning>) -> (f64, UnitExpr) {
    match expr {
        Expr::Number(n) => (*n, UnitExpr::dimensionless()),
        Expr::Symbol(name) => match table.get(name) {
            Some(binding) => (binding.value, binding.unit.clone()),
            // Unknown symbols are rejected before the walk starts
            None => (f64::NAN, UnitExpr::dimensionless()),
        },
        Expr::Neg(inner) => {
            let (value, unit) = eval_node(inner, table, warnings);
            (-value, unit)
        }
        Expr::Binary { op, left, right } => {
            let (lv, lu) = eval_node(left, table, warnings);
            let (rv, ru) = eval_node(right, table, warnings);
            match op {
                BinaryOp::Add | BinaryOp::Sub => {
                    if !lu.equals_structurally(&ru) {
                        push_unique(
                            warnings,
                            EngineWarning::UnitMismatch {
                                expected: lu.display_label(),
                                actual: ru.display_label(),
                            },
                        );
                    }
                    let value = if *op == BinaryOp::Add { lv + rv } else { lv - rv };
                    (value, lu)
                }
                BinaryOp::Mul => (lv * rv, combine_unit(&lu, &ru, UnitOp::Multiply, warnings)),
                BinaryOp::Div => (lv / rv, combine_unit(&lu, &ru, UnitOp::Divide, warnings)),
                BinaryOp::Pow => (lv.powf(rv), pow_unit(&lu, &ru, rv, warnings)),
            }
        }
    }
}

fn pow_unit(
    base: &UnitExpr,
    exponent_unit: &UnitExpr,
    exponent: f64,
    warnings: &mut Vec<EngineWarning>,
) -> UnitExpr {
    if !exponent_unit.is_dimensionless() {
        push_unique(
            warnings,
            EngineWarning::UnitMismatch {
                expected: DIMENSIONLESS.to_string(),
                actual: exponent_unit.display_label(),
            },
        );
    }
    if base.is_dimensionless() {
        return UnitExpr::dimensionless();
    }
    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
        return base
            .powi(exponent as i32)
            .unwrap_or_else(|| exponent_overflow(base, warnings));
    }
    push_unique(
        warnings,
        EngineWarning::InvalidFormula {
            message: format!(
                "non-integer exponent {exponent} applied to unit '{}'",
                base.label()
            ),
        },
    );
    UnitExpr::dimensionless()
}

fn combine_unit(
    left: &UnitExpr,
    right: &UnitExpr,
    op: UnitOp,
    warnings: &mut Vec<EngineWarning>,
) -> UnitExpr {
    UnitExpr::combine(left, right, op).unwrap_or_else(|| exponent_overflow(left, warnings))
}

/// Fallback when a unit exponent leaves the `i32` range
fn exponent_overflow(base: &UnitExpr, warnings: &mut Vec<EngineWarning>) -> UnitExpr {
    push_unique(
        warnings,
        EngineWarning::InvalidFormula {
            message: format!("unit exponent overflow in '{}'", base.label()),
        },
    );
    UnitExpr::dimensionless()
}

fn push_unique(warnings: &mut Vec<EngineWarning>, warning: EngineWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
