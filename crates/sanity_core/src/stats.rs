//! Descriptive statistics and histogram binning for Monte Carlo samples.
//!
//! Conventions:
//!
//! - Standard deviation is the **sample** standard deviation (Bessel's
//!   correction, denominator `n − 1`); a single value has deviation `0`.
//! - Percentiles use linear interpolation between closest ranks (R-7, the
//!   default of R, NumPy and Excel's `PERCENTILE.INC`): rank `p · (n − 1)`.

use crate::model::HistogramBin;

/// Default number of histogram bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Summary of a non-empty sample set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub stdev: f64,
    pub p05: f64,
    pub p50: f64,
    pub p95: f64,
}

impl Summary {
    /// Summarize `values`, returning `None` when empty. Sorts in place.
    pub fn from_samples(values: &mut [f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let mean = mean(values)?;
        Some(Self {
            mean,
            stdev: sample_std_dev(values, mean),
            p05: quantile_sorted(values, 0.05)?,
            p50: quantile_sorted(values, 0.50)?,
            p95: quantile_sorted(values, 0.95)?,
        })
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation around a precomputed mean
pub fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// `p`-th quantile of sorted data by linear interpolation (R-7)
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        Some(sorted[n - 1])
    } else {
        Some((1.0 - g) * sorted[j] + g * sorted[j + 1])
    }
}

/// Bin `values` into `bins` equal-width bins spanning `[min, max]`.
///
/// Bins are half-open `[x0, x1)` except the last, which also holds the
/// maximum. Zero spread collapses to one bin holding every value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bins = bins.max(1);

    let range = max - min;
    if range <= 0.0 || bins == 1 {
        return vec![HistogramBin {
            x0: min,
            x1: max,
            count: values.len(),
        }];
    }

    let width = range / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let bin = ((v - min) / width).floor() as usize;
        counts[bin.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            x0: min + width * i as f64,
            x1: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}
