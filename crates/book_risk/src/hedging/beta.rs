//! Single-factor OLS beta.

use book_core::market_data::DatedSeries;
use book_core::math::{population_covariance, population_variance};

/// Minimum aligned observations for a beta estimate.
pub const MIN_BETA_OBSERVATIONS: usize = 30;

/// Beta with the aligned sample size behind it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BetaEstimate {
    /// `Cov(dep, indep) / Var(indep)`, or 0.0 when unreliable
    pub beta: f64,
    /// Aligned observations used
    pub sample_size: usize,
}

impl BetaEstimate {
    /// Returns `true` when the sample met the minimum size.
    ///
    /// Distinguishes a genuine zero beta from "not enough data".
    #[inline]
    pub fn is_reliable(&self) -> bool {
        self.sample_size >= MIN_BETA_OBSERVATIONS
    }
}

/// Estimates the beta of `dependent` on `independent`.
///
/// Both series are intersected on dates and rows with a missing value are
/// dropped. Population moments are used for numerator and denominator.
/// Fewer than [`MIN_BETA_OBSERVATIONS`] rows, or zero variance in
/// `independent`, give a beta of 0.0.
pub fn estimate_beta(dependent: &DatedSeries, independent: &DatedSeries) -> BetaEstimate {
    let (ys, xs): (Vec<f64>, Vec<f64>) = dependent
        .zip_observed(independent)
        .into_iter()
        .map(|(_, y, x)| (y, x))
        .unzip();
    let sample_size = xs.len();

    if sample_size < MIN_BETA_OBSERVATIONS {
        return BetaEstimate {
            beta: 0.0,
            sample_size,
        };
    }

    let beta = match (population_covariance(&ys, &xs), population_variance(&xs)) {
        (Some(cov), Some(var)) if var > 0.0 => cov / var,
        _ => 0.0,
    };
    BetaEstimate { beta, sample_size }
}

/// Beta of `dependent` on `independent`; see [`estimate_beta`].
///
/// # Examples
///
/// ```
/// use book_core::market_data::DatedSeries;
/// use book_risk::hedging::beta;
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let dates: Vec<NaiveDate> = (0..40).map(|i| start + Duration::days(i)).collect();
/// let market: Vec<f64> = (0..40).map(|i| ((i * 13) % 7) as f64 / 100.0 - 0.03).collect();
/// let stock: Vec<f64> = market.iter().map(|m| 1.5 * m).collect();
///
/// let m = DatedSeries::from_values(dates.clone(), market).unwrap();
/// let s = DatedSeries::from_values(dates, stock).unwrap();
/// assert!((beta(&s, &m) - 1.5).abs() < 1e-12);
/// ```
pub fn beta(dependent: &DatedSeries, independent: &DatedSeries) -> f64 {
    estimate_beta(dependent, independent).beta
}
