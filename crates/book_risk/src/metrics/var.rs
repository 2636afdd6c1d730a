//! Historical VaR and Expected Shortfall.

use std::cmp::Ordering;

use book_core::math::{mean, quantile_sorted};

use crate::error::RiskError;

/// Minimum number of observations for a decision-grade estimate.
pub const MIN_OBSERVATIONS: usize = 30;

/// Sorted finite sample and its `(1 - alpha)` quantile.
fn lower_tail(sample: &[f64], alpha: f64) -> Result<(Vec<f64>, f64), RiskError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(RiskError::InvalidConfidence(alpha));
    }
    let mut sorted: Vec<f64> = sample.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.len() < MIN_OBSERVATIONS {
        return Err(RiskError::insufficient(MIN_OBSERVATIONS, sorted.len()));
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let q = quantile_sorted(&sorted, 1.0 - alpha)
        .ok_or_else(|| RiskError::insufficient(MIN_OBSERVATIONS, 0))?;
    Ok((sorted, q))
}

fn shortfall(sorted: &[f64], q: f64) -> Result<f64, RiskError> {
    let tail_len = sorted.partition_point(|x| *x <= q);
    mean(&sorted[..tail_len])
        .map(|m| -m)
        .ok_or(RiskError::EmptyTail)
}

/// Historical Value-at-Risk at confidence `alpha`.
///
/// Returns `-q` where `q` is the `(1 - alpha)` empirical quantile of the
/// finite values in `sample`. A positive number is a loss; the result is
/// not floored at zero.
///
/// # Errors
///
/// - [`RiskError::InvalidConfidence`] if `alpha` is not in `(0, 1)`
/// - [`RiskError::InsufficientData`] with fewer than [`MIN_OBSERVATIONS`] finite values
///
/// # Examples
///
/// ```
/// use book_risk::metrics::historical_var;
///
/// let pnl: Vec<f64> = (0..100).map(|i| i as f64 - 50.0).collect();
/// let var = historical_var(&pnl, 0.99).unwrap();
/// assert!((var - 49.01).abs() < 1e-9);
///
/// assert!(historical_var(&[1.0, 2.0, 3.0], 0.95).is_err());
/// ```
pub fn historical_var(sample: &[f64], alpha: f64) -> Result<f64, RiskError> {
    let (_, q) = lower_tail(sample, alpha)?;
    Ok(-q)
}

/// Historical Expected Shortfall at confidence `alpha`.
///
/// Negated mean of the finite values at or below the VaR quantile.
///
/// # Errors
///
/// Same as [`historical_var`], plus [`RiskError::EmptyTail`] if no value
/// lies at or below the quantile.
pub fn historical_es(sample: &[f64], alpha: f64) -> Result<f64, RiskError> {
    let (sorted, q) = lower_tail(sample, alpha)?;
    shortfall(&sorted, q)
}

/// VaR and ES from a single sort of the sample.
pub fn historical_var_es(sample: &[f64], alpha: f64) -> Result<(f64, f64), RiskError> {
    let (sorted, q) = lower_tail(sample, alpha)?;
    Ok((-q, shortfall(&sorted, q)?))
}
