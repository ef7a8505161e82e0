//! Result types returned by the engine's run functions
//!
//! Every run function is total: it always returns one of these, carrying an
//! `error` when no meaningful value could be computed. Warnings ride along
//! with otherwise-usable results.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Informational issue attached to a result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EngineWarning {
    UnitMismatch { expected: String, actual: String },
    MissingVariable { symbol: String },
    InvalidFormula { message: String },
}

impl std::fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineWarning::UnitMismatch { expected, actual } => {
                write!(f, "unit mismatch: expected {expected}, got {actual}")
            }
            EngineWarning::MissingVariable { symbol } => write!(f, "unknown symbol '{symbol}'"),
            EngineWarning::InvalidFormula { message } => write!(f, "invalid formula: {message}"),
        }
    }
}

/// Append warnings to `into`, skipping any already present.
///
/// Order of first appearance is preserved.
pub fn merge_warnings(
    into: &mut Vec<EngineWarning>,
    seen: &mut FxHashSet<EngineWarning>,
    warnings: impl IntoIterator<Item = EngineWarning>,
) {
    for warning in warnings {
        if seen.insert(warning.clone()) {
            into.push(warning);
        }
    }
}

/// Result of a single formula evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResult {
    /// `None` exactly when `error` is set
    pub value: Option<f64>,
    pub unit: String,
    pub warnings: Vec<EngineWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluateResult {
    pub fn success(value: f64, unit: String, warnings: Vec<EngineWarning>) -> Self {
        Self {
            value: Some(value),
            unit,
            warnings,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, warnings: Vec<EngineWarning>) -> Self {
        Self {
            value: None,
            unit: String::new(),
            warnings,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One sample of a sweep series; `y` is `None` where evaluation failed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub x: f64,
    pub y: Option<f64>,
}

/// Result of a one-dimensional parameter sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    pub points: Vec<SweepPoint>,
    pub x_unit: String,
    pub y_unit: String,
    pub warnings: Vec<EngineWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SweepResult {
    pub fn failure(error: impl Into<String>, warnings: Vec<EngineWarning>) -> Self {
        Self {
            points: Vec::new(),
            x_unit: String::new(),
            y_unit: String::new(),
            warnings,
            error: Some(error.into()),
        }
    }
}

/// Summary statistics of a Monte Carlo run; all `None` when nothing succeeded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloStats {
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
    pub p05: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub unit: Option<String>,
}

/// Histogram bin covering `[x0, x1)`; the final bin is closed on both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Result of a Monte Carlo uncertainty propagation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub stats: MonteCarloStats,
    pub histogram: Vec<HistogramBin>,
    pub warnings: Vec<EngineWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MonteCarloResult {
    pub fn failure(error: impl Into<String>, warnings: Vec<EngineWarning>) -> Self {
        Self {
            stats: MonteCarloStats::default(),
            histogram: Vec::new(),
            warnings,
            error: Some(error.into()),
        }
    }

    /// Total number of samples represented in the histogram
    pub fn sample_count(&self) -> usize {
        self.histogram.iter().map(|b| b.count).sum()
    }
}
