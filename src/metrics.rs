//! Descriptive statistics over repeated timing samples.

use crate::error::ReportError;
use crate::model::{MeanPolicy, Scaling};

/// Maximum-likelihood normal fit: arithmetic mean and population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalFit {
    pub mean: f64,
    pub std: f64,
}

/// Fit a normal distribution to `samples`. `None` when there are no samples.
pub fn fit_normal(samples: &[f64]) -> Option<NormalFit> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some(NormalFit {
        mean,
        std: variance.sqrt(),
    })
}

/// Result of the one-sigma outlier filter over a sample set.
#[derive(Debug, Clone)]
pub struct TrimmedMean {
    /// Unfiltered arithmetic mean.
    pub raw_mean: f64,
    /// Fit over all samples.
    pub fit: NormalFit,
    /// Fit over the samples kept by the filter.
    pub refit: NormalFit,
    /// Samples inside `[fit.mean - fit.std, fit.mean + fit.std]`, in input order.
    pub filtered: Vec<f64>,
}

impl TrimmedMean {
    /// The scalar reported for this sample set.
    #[allow(clippy::if_same_then_else)]
    pub fn value(&self, policy: MeanPolicy) -> f64 {
        match policy {
            // Equal or not, the historical reports always kept the raw mean.
            MeanPolicy::Arithmetic => {
                if self.raw_mean == self.refit.mean {
                    self.raw_mean
                } else {
                    self.raw_mean
                }
            }
            MeanPolicy::Trimmed => self.refit.mean,
        }
    }
}

/// Fit, drop samples farther than one standard deviation from the mean, refit.
///
/// When every sample sits on the interval bounds, rounding can push all of
/// them outside it; the full sample set and its fit are kept in that case.
/// `None` only for an empty input.
pub fn trimmed_mean(samples: &[f64]) -> Option<TrimmedMean> {
    let fit = fit_normal(samples)?;
    let raw_mean = samples.iter().sum::<f64>() / samples.len() as f64;

    let (lo, hi) = (fit.mean - fit.std, fit.mean + fit.std);
    let kept: Vec<f64> = samples
        .iter()
        .copied()
        .filter(|x| *x >= lo && *x <= hi)
        .collect();
    let (filtered, refit) = match fit_normal(&kept) {
        Some(refit) => (kept, refit),
        None => (samples.to_vec(), fit),
    };

    Some(TrimmedMean {
        raw_mean,
        fit,
        refit,
        filtered,
    })
}

/// Speedup and efficiency of a parallel time `tp` on `nt` processes against
/// the serial time `t`.
pub fn compute_speedup(t: f64, tp: f64, nt: u32) -> Result<Scaling, ReportError> {
    if tp == 0.0 || nt == 0 {
        return Err(ReportError::DivisionByZero { tp, nt });
    }
    Ok(Scaling {
        speedup: t / tp,
        efficiency: t / (tp * f64::from(nt)),
    })
}

/// Histogram bin count by Sturges' rule.
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Gaussian kernel density estimate of `samples` on `points` evenly spaced
/// grid values, using Scott's bandwidth and extending three bandwidths past
/// the data range. Returns `(x, density)` pairs.
pub fn gaussian_kde(samples: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    if samples.len() < 2 || points < 2 {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let sample_var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bandwidth = sample_var.sqrt() * n.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return None;
    }

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
    let step = (max - min) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let curve = (0..points)
        .map(|i| {
            let x = min + step * i as f64;
            let density = samples
                .iter()
                .map(|s| (-0.5 * ((x - s) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect();
    Some(curve)
}
