//! Monte Carlo uncertainty propagation.
//!
//! Each iteration draws one sample for every variable that declares a
//! distribution and both bounds, holds all other variables at their point
//! value, and evaluates the formula. Successful results are reduced to
//! summary statistics and a histogram.

use rand::distr::{Distribution as _, Uniform};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::Normal;
use rustc_hash::FxHashSet;

use crate::expr::{Formula, SymbolTable, compile_warnings};
use crate::model::{
    Distribution, EngineWarning, LabSession, MonteCarloResult, MonteCarloStats, VariableEntry,
    merge_warnings,
};
use crate::stats::{self, DEFAULT_HISTOGRAM_BINS, Summary};

/// Default divisor mapping a `[min, max]` range to a normal σ (±3σ span)
pub const DEFAULT_NORMAL_SIGMA_DIVISOR: f64 = 6.0;

/// Tunables for the Monte Carlo runner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloOptions {
    /// Number of histogram bins over `[min(results), max(results)]`
    pub histogram_bins: usize,
    /// σ = (max − min) / divisor for `normal` inputs
    pub normal_sigma_divisor: f64,
}

impl Default for MonteCarloOptions {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            normal_sigma_divisor: DEFAULT_NORMAL_SIGMA_DIVISOR,
        }
    }
}

/// Per-variable sample source
#[derive(Debug, Clone)]
enum Sampler {
    Constant(f64),
    Uniform(Uniform<f64>),
    Normal(Normal<f64>),
}

impl Sampler {
    fn for_variable(variable: &VariableEntry, options: &MonteCarloOptions) -> Option<Self> {
        let distribution = variable.distribution?;
        let (min, max) = variable.range()?;
        if min == max {
            return Some(Sampler::Constant(min));
        }

        let sampler = match distribution {
            Distribution::Uniform => Uniform::new_inclusive(min, max).map(Sampler::Uniform).ok(),
            Distribution::Normal => {
                let mean = (min + max) / 2.0;
                let std_dev = (max - min) / options.normal_sigma_divisor;
                Normal::new(mean, std_dev).map(Sampler::Normal).ok()
            }
        };
        if sampler.is_none() {
            tracing::warn!(
                variable = %variable.id,
                min,
                max,
                ?distribution,
                "unusable distribution parameters, holding midpoint constant"
            );
        }
        Some(sampler.unwrap_or(Sampler::Constant((min + max) / 2.0)))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Constant(v) => *v,
            Sampler::Uniform(d) => d.sample(rng),
            Sampler::Normal(d) => d.sample(rng),
        }
    }
}

/// Run Monte Carlo with default options, seeded from the session's
/// configured seed or a fresh random one.
pub fn run_monte_carlo(session: &LabSession) -> MonteCarloResult {
    let seed = session
        .monte_carlo
        .seed
        .unwrap_or_else(|| rand::rng().next_u64());
    let mut rng = SmallRng::seed_from_u64(seed);
    run_monte_carlo_with_rng(session, &mut rng)
}

/// Run Monte Carlo with default options and a caller-supplied RNG.
pub fn run_monte_carlo_with_rng<R: Rng + ?Sized>(
    session: &LabSession,
    rng: &mut R,
) -> MonteCarloResult {
    run_monte_carlo_with_options(session, &MonteCarloOptions::default(), rng)
}

pub fn run_monte_carlo_with_options<R: Rng + ?Sized>(
    session: &LabSession,
    options: &MonteCarloOptions,
    rng: &mut R,
) -> MonteCarloResult {
    let formula = match Formula::compile(&session.formula) {
        Ok(formula) => formula,
        Err(e) => return MonteCarloResult::failure(e.to_string(), compile_warnings(&e)),
    };

    let iterations = session.monte_carlo.clamped_iterations();
    let samplers: Vec<(&VariableEntry, Sampler)> = session
        .variables
        .iter()
        .filter_map(|v| Sampler::for_variable(v, options).map(|s| (v, s)))
        .collect();
    let mut table = SymbolTable::from_variables(&session.variables);
    let expected_unit = session.expected_unit();

    let mut values = Vec::with_capacity(iterations);
    let mut warnings = Vec::new();
    let mut seen = FxHashSet::default();
    let mut unit: Option<String> = None;
    let mut first_error: Option<String> = None;
    let mut failed = 0usize;

    for _ in 0..iterations {
        for (variable, sampler) in &samplers {
            table.set_value(variable, sampler.sample(rng));
        }
        let result = formula.evaluate_result(&table, expected_unit);
        merge_warnings(&mut warnings, &mut seen, result.warnings);
        match result.value {
            Some(value) => {
                values.push(value);
                if unit.is_none() {
                    unit = Some(result.unit);
                }
            }
            None => {
                failed += 1;
                if first_error.is_none() {
                    first_error = result.error;
                }
            }
        }
    }

    if failed > 0 {
        merge_warnings(
            &mut warnings,
            &mut seen,
            [EngineWarning::InvalidFormula {
                message: format!("{failed} of {iterations} iterations failed to evaluate"),
            }],
        );
    }

    tracing::debug!(
        iterations,
        sampled = samplers.len(),
        failed,
        "monte carlo complete"
    );

    let histogram = stats::histogram(&values, options.histogram_bins);
    let Some(summary) = Summary::from_samples(&mut values) else {
        let reason = first_error.unwrap_or_else(|| "no result".to_string());
        return MonteCarloResult::failure(format!("every iteration failed: {reason}"), warnings);
    };

    MonteCarloResult {
        stats: MonteCarloStats {
            mean: Some(summary.mean),
            stdev: Some(summary.stdev),
            p05: Some(summary.p05),
            p50: Some(summary.p50),
            p95: Some(summary.p95),
            unit,
        },
        histogram,
        warnings,
        error: None,
    }
}
