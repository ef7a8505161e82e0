//! Session documents: the editable state of one sanity-check workspace.
//!
//! A [`LabSession`] is owned by a UI shell and mutated field-by-field as the
//! user edits it. The engine only ever reads it.

use serde::{Deserialize, Serialize};

use super::ids::{SessionId, VariableId};

/// Sweep point count bounds and default
pub const SWEEP_POINTS_MIN: usize = 2;
pub const SWEEP_POINTS_MAX: usize = 200;
pub const SWEEP_POINTS_DEFAULT: usize = 50;

/// Monte Carlo iteration bounds and default
pub const MC_ITERATIONS_MIN: usize = 100;
pub const MC_ITERATIONS_MAX: usize = 10_000;
pub const MC_ITERATIONS_DEFAULT: usize = 1_000;

/// Sampling distribution for a Monte Carlo input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Uniform over `[min, max]`
    Uniform,
    /// Normal centred on the range midpoint, `(max - min)` spanning ±3σ by default
    Normal,
}

/// One named, unit-tagged quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableEntry {
    pub id: VariableId,
    /// Token used inside formulas
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub value: f64,
    /// Free-text unit label, `""` is dimensionless
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

impl VariableEntry {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, value: f64) -> Self {
        Self {
            id: VariableId::new(id),
            symbol: symbol.into(),
            name: String::new(),
            description: String::new(),
            value,
            unit: String::new(),
            min: None,
            max: None,
            distribution: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// The declared `(min, max)` range, when both bounds are set and ordered.
    pub fn range(&self) -> Option<(f64, f64)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min <= max => Some((min, max)),
            _ => None,
        }
    }

    /// Whether this variable is drawn randomly during Monte Carlo
    pub fn is_sampled(&self) -> bool {
        self.distribution.is_some() && self.range().is_some()
    }
}

/// Sweep configuration stored with the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_id: Option<VariableId>,
    #[serde(default = "default_sweep_points")]
    pub points: usize,
}

fn default_sweep_points() -> usize {
    SWEEP_POINTS_DEFAULT
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            variable_id: None,
            points: SWEEP_POINTS_DEFAULT,
        }
    }
}

impl SweepConfig {
    /// Point count clamped to the supported range
    pub fn clamped_points(&self) -> usize {
        self.points.clamp(SWEEP_POINTS_MIN, SWEEP_POINTS_MAX)
    }
}

/// Monte Carlo configuration stored with the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Optional seed for reproducible runs (None = fresh seed each run)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_iterations() -> usize {
    MC_ITERATIONS_DEFAULT
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: MC_ITERATIONS_DEFAULT,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    /// Iteration count clamped to the supported range
    pub fn clamped_iterations(&self) -> usize {
        self.iterations.clamp(MC_ITERATIONS_MIN, MC_ITERATIONS_MAX)
    }
}

/// The full editable state of one sanity-check workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub variables: Vec<VariableEntry>,
    #[serde(default)]
    pub formula: String,
    /// The user's claim about the output unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_unit: Option<String>,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}

impl LabSession {
    pub fn new(formula: impl Into<String>, variables: Vec<VariableEntry>) -> Self {
        Self {
            formula: formula.into(),
            variables,
            ..Default::default()
        }
    }

    pub fn variable(&self, id: &VariableId) -> Option<&VariableEntry> {
        self.variables.iter().find(|v| &v.id == id)
    }

    /// Expected unit if the user set a non-empty one
    pub fn expected_unit(&self) -> Option<&str> {
        self.expected_unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// A named session in the saved list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
    pub id: SessionId,
    pub title: String,
    pub updated_at: jiff::Timestamp,
    pub session: LabSession,
}
