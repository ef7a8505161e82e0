//! One-dimensional parameter sweep.
//!
//! Every variable is held at its point value except the swept one, which
//! steps evenly from its `min` to its `max`. The formula is compiled once
//! and evaluated at each step.

use rustc_hash::FxHashSet;

use crate::expr::{Formula, SymbolTable, compile_warnings};
use crate::model::{
    EngineWarning, LabSession, SweepPoint, SweepResult, VariableEntry, VariableId, merge_warnings,
};

/// Error reported when the target variable has no usable range
pub const RANGE_MISSING: &str = "range missing";

/// Evenly spaced values from `min` to `max` inclusive. The last value is
/// exactly `max`.
pub fn sweep_values(min: f64, max: f64, points: usize) -> Vec<f64> {
    if points <= 1 {
        return vec![min];
    }
    let step = (max - min) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            if i + 1 == points {
                max
            } else {
                min + step * i as f64
            }
        })
        .collect()
}

/// Sweep `variable_id` (or the session's configured sweep variable when
/// `None`) across its declared range.
pub fn run_sweep(session: &LabSession, variable_id: Option<&VariableId>) -> SweepResult {
    let target = variable_id
        .or(session.sweep.variable_id.as_ref())
        .and_then(|id| session.variable(id));
    let Some(target) = target else {
        return SweepResult::failure(RANGE_MISSING, Vec::new());
    };
    let Some((min, max)) = target.range() else {
        return SweepResult::failure(RANGE_MISSING, Vec::new());
    };

    let points = session.sweep.clamped_points();
    let formula = match Formula::compile(&session.formula) {
        Ok(formula) => formula,
        Err(e) => {
            // Every step would fail the same way; keep the series shape so
            // charts still render an empty axis.
            return SweepResult {
                points: sweep_values(min, max, points)
                    .into_iter()
                    .map(|x| SweepPoint { x, y: None })
                    .collect(),
                x_unit: target.unit.clone(),
                y_unit: String::new(),
                warnings: compile_warnings(&e),
                error: Some(e.to_string()),
            };
        }
    };

    let mut table = SymbolTable::from_variables(&session.variables);
    if !table.set_value(target, min) {
        return shadowed(session, target);
    }
    let expected_unit = session.expected_unit();

    let mut series = Vec::with_capacity(points);
    let mut warnings = Vec::new();
    let mut seen = FxHashSet::default();
    let mut y_unit: Option<String> = None;

    for x in sweep_values(min, max, points) {
        table.set_value(target, x);
        let result = formula.evaluate_result(&table, expected_unit);
        if y_unit.is_none() && result.is_ok() {
            y_unit = Some(result.unit.clone());
        }
        series.push(SweepPoint { x, y: result.value });
        merge_warnings(&mut warnings, &mut seen, result.warnings);
    }

    tracing::debug!(
        variable = %target.id,
        points,
        failed = series.iter().filter(|p| p.y.is_none()).count(),
        "sweep complete"
    );

    SweepResult {
        points: series,
        x_unit: target.unit.clone(),
        y_unit: y_unit.unwrap_or_default(),
        warnings,
        error: None,
    }
}

/// The swept variable's symbol is bound to an earlier entry, so stepping it
/// would leave the formula unchanged.
fn shadowed(session: &LabSession, target: &VariableEntry) -> SweepResult {
    let symbol = target.symbol.trim();
    let owner = session
        .variables
        .iter()
        .find(|v| v.symbol.trim() == symbol)
        .map_or(symbol, |v| v.id.as_str());
    tracing::debug!(variable = %target.id, owner, "sweep variable is shadowed");
    SweepResult::failure(
        RANGE_MISSING,
        vec![EngineWarning::InvalidFormula {
            message: format!("symbol '{symbol}' of '{}' is shadowed by '{owner}'", target.id),
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> LabSession {
        let mut session = LabSession::new(
            "a / b",
            vec![
                VariableEntry::new("a", "a", 1.0)
                    .with_unit("m")
                    .with_range(-1.0, 1.0),
                VariableEntry::new("b", "b", 2.0)
                    .with_unit("s")
                    .with_range(0.0, 4.0),
            ],
        );
        session.sweep.points = 5;
        session
    }

    #[test]
    fn test_sweep_values_endpoints() {
        let values = sweep_values(0.1, 0.7, 7);
        assert_eq!(values.len(), 7);
        assert_eq!(values[0], 0.1);
        assert_eq!(values[6], 0.7);
        assert_eq!(sweep_values(2.0, 2.0, 3), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_sweep_holds_other_variables() {
        let result = run_sweep(&session(), Some(&VariableId::new("a")));
        assert!(result.error.is_none());
        let ys: Vec<Option<f64>> = result.points.iter().map(|p| p.y).collect();
        assert_eq!(
            ys,
            vec![Some(-0.5), Some(-0.25), Some(0.0), Some(0.25), Some(0.5)]
        );
        assert_eq!(result.x_unit, "m");
        assert_eq!(result.y_unit, "m/s");
    }

    #[test]
    fn test_failed_steps_are_gaps() {
        // b = 0 at the first step divides by zero
        let result = run_sweep(&session(), Some(&VariableId::new("b")));
        assert_eq!(result.points.len(), 5);
        assert_eq!(result.points[0].y, None);
        assert_eq!(result.points[1].y, Some(1.0));
        assert_eq!(result.y_unit, "m/s");
    }

    #[test]
    fn test_uses_configured_variable_when_none_given() {
        let mut s = session();
        s.sweep.variable_id = Some(VariableId::new("b"));
        let result = run_sweep(&s, None);
        assert_eq!(result.x_unit, "s");
    }

    #[test]
    fn test_range_missing() {
        let mut s = session();
        s.variables[0].max = None;
        let result = run_sweep(&s, Some(&VariableId::new("a")));
        assert_eq!(result.error.as_deref(), Some(RANGE_MISSING));
        assert!(result.points.is_empty());

        let result = run_sweep(&s, Some(&VariableId::new("nope")));
        assert_eq!(result.error.as_deref(), Some(RANGE_MISSING));

        let result = run_sweep(&s, None);
        assert_eq!(result.error.as_deref(), Some(RANGE_MISSING));
    }

    #[test]
    fn test_points_are_clamped() {
        let mut s = session();
        s.sweep.points = 0;
        assert_eq!(run_sweep(&s, Some(&VariableId::new("a"))).points.len(), 2);
        s.sweep.points = 1_000;
        assert_eq!(run_sweep(&s, Some(&VariableId::new("a"))).points.len(), 200);
    }

    #[test]
    fn test_warnings_are_deduplicated() {
        let mut s = session();
        s.expected_unit = Some("kg".into());
        let result = run_sweep(&s, Some(&VariableId::new("a")));
        assert_eq!(
            result.warnings,
            vec![EngineWarning::UnitMismatch {
                expected: "kg".into(),
                actual: "m/s".into()
            }]
        );
    }

    #[test]
    fn test_all_steps_failing_leaves_y_unit_empty() {
        let mut s = session();
        s.formula = "a / zz".into();
        let result = run_sweep(&s, Some(&VariableId::new("a")));
        assert!(result.points.iter().all(|p| p.y.is_none()));
        assert_eq!(result.y_unit, "");
        assert_eq!(
            result.warnings,
            vec![EngineWarning::MissingVariable { symbol: "zz".into() }]
        );
    }

    #[test]
    fn test_bad_formula_keeps_series_shape() {
        let mut s = session();
        s.formula = "a +".into();
        let result = run_sweep(&s, Some(&VariableId::new("a")));
        assert!(result.error.is_some());
        assert_eq!(result.points.len(), 5);
        assert!(result.points.iter().all(|p| p.y.is_none()));
        assert_eq!(result.points[4].x, 1.0);
    }

    #[test]
    fn test_shadowed_variable_is_not_swept() {
        let mut s = session();
        s.variables.push(
            VariableEntry::new("a2", "a", 5.0)
                .with_unit("m")
                .with_range(0.0, 10.0),
        );
        let result = run_sweep(&s, Some(&VariableId::new("a2")));
        assert_eq!(result.error.as_deref(), Some(RANGE_MISSING));
        assert!(result.points.is_empty());
        assert_eq!(
            result.warnings,
            vec![EngineWarning::InvalidFormula {
                message: "symbol 'a' of 'a2' is shadowed by 'a'".into()
            }]
        );

        // The first entry still owns the symbol and sweeps normally
        let result = run_sweep(&s, Some(&VariableId::new("a")));
        assert!(result.error.is_none());
        assert_eq!(result.points.len(), 5);
    }
}
