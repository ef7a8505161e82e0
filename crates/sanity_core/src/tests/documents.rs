//! Session documents as they arrive from storage or an import file

use crate::model::{Distribution, LabSession, SavedSession, VariableId};
use crate::{SessionError, evaluate_formula, run_sweep};

const BEAM_YAML: &str = r#"
title: Cantilever tip deflection
formula: P * L^3 / (3 * E * I)
expectedUnit: m
variables:
  - id: load
    symbol: P
    name: Tip load
    value: 1200
    unit: N
    min: 1000
    max: 1500
    distribution: normal
  - id: length
    symbol: L
    value: 2
    unit: m
  - id: modulus
    symbol: E
    value: 2.0e11
    unit: N/m^2
  - id: inertia
    symbol: I
    value: 8.0e-6
    unit: m^4
sweep:
  variableId: load
  points: 6
monteCarlo:
  iterations: 500
  seed: 17
"#;

const SAVED_JSON: &str = r#"[
  {
    "id": "session-1",
    "title": "Ohm",
    "updatedAt": "2026-03-01T12:00:00Z",
    "session": {
      "formula": "V / R",
      "variables": [
        {"id": "v", "symbol": "V", "value": 12, "unit": "V"},
        {"id": "r", "symbol": "R", "value": 4, "unit": "ohm", "min": 2, "max": 8, "distribution": "uniform"}
      ],
      "sweep": {"variableId": "r", "points": 3},
      "monteCarlo": {"iterations": 100}
    }
  }
]"#;

#[test]
fn test_yaml_document_evaluates() {
    let session = LabSession::from_yaml(BEAM_YAML).unwrap();
    assert_eq!(session.title.as_deref(), Some("Cantilever tip deflection"));
    assert_eq!(session.variables[0].distribution, Some(Distribution::Normal));
    assert_eq!(session.monte_carlo.seed, Some(17));

    let result = evaluate_formula(&session);
    // 1200 · 8 / (3 · 200e9 · 8e-6) = 0.002 m
    assert!((result.value.unwrap() - 0.002).abs() < 1e-12);
    assert_eq!(result.unit, "m");
    assert!(result.warnings.is_empty());

    let sweep = run_sweep(&session, None);
    assert_eq!(sweep.points.len(), 6);
    assert_eq!(sweep.x_unit, "N");
}

#[test]
fn test_yaml_export_reimports() {
    let session = LabSession::from_yaml(BEAM_YAML).unwrap();
    let exported = session.to_yaml().unwrap();
    assert_eq!(LabSession::from_yaml(&exported).unwrap(), session);
}

#[test]
fn test_saved_list_decodes() {
    let list = SavedSession::list_from_json(SAVED_JSON).unwrap();
    assert_eq!(list.len(), 1);
    let saved = &list[0];
    assert_eq!(saved.id.as_str(), "session-1");
    assert_eq!(saved.session.sweep.variable_id, Some(VariableId::new("r")));

    let result = evaluate_formula(&saved.session);
    assert_eq!(result.value, Some(3.0));
    assert_eq!(result.unit, "V/ohm");

    let json = SavedSession::list_to_json(&list).unwrap();
    assert_eq!(SavedSession::list_from_json(&json).unwrap(), list);
}

#[test]
fn test_partially_typed_payloads_are_rejected() {
    let missing_value = r#"{"formula": "a", "variables": [{"id": "a", "symbol": "a"}]}"#;
    assert!(matches!(
        LabSession::from_json(missing_value),
        Err(SessionError::Json(_))
    ));

    let bad_timestamp = SAVED_JSON.replace("2026-03-01T12:00:00Z", "yesterday");
    assert!(SavedSession::list_from_json(&bad_timestamp).is_err());

    let not_a_list = r#"{"id": "x"}"#;
    assert!(SavedSession::list_from_json(not_a_list).is_err());

    let inverted = BEAM_YAML.replace("max: 1500", "max: 900");
    assert!(matches!(
        LabSession::from_yaml(&inverted),
        Err(SessionError::Invalid { .. })
    ));
}
