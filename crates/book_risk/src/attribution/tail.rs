//! Tail-loss contributors.

use book_core::market_data::DatedSeries;
use book_core::math::empirical_quantile;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::RiskError;
use crate::pnl::PnlMatrix;

/// Fewest percentile tail days before falling back to the worst N days.
pub const MIN_TAIL_DAYS: usize = 5;

/// Tail selection settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TailConfig {
    /// Tail percentile, in percent (1.0 = worst 1% of days)
    pub tail_pct: f64,
    /// Worst days used when the percentile tail is too thin
    pub worst_n: usize,
    /// Portfolio observations required
    pub min_observations: usize,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            tail_pct: 1.0,
            worst_n: 10,
            min_observations: 60,
        }
    }
}

/// One position's behaviour on tail days.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TailContributor {
    /// Position name
    pub name: String,
    /// Mean PnL across tail days
    pub avg_pnl: f64,
    /// Total PnL across tail days
    pub sum_pnl: f64,
    /// `-sum_pnl / total_tail_loss`; 0 when there is no tail loss
    pub loss_share: f64,
}

/// Positions ranked by their PnL on the portfolio's worst days.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TailAttribution {
    /// Portfolio PnL quantile at `tail_pct`
    pub threshold: f64,
    /// Tail days with their portfolio PnL, in date order
    pub tail_days: Vec<(NaiveDate, f64)>,
    /// The percentile set was too thin and the worst N days were used
    pub used_worst_n: bool,
    /// Sum of `-PnL` over tail days
    pub total_tail_loss: f64,
    /// Contributors, most negative average first
    pub contributors: Vec<TailContributor>,
    /// The worst N portfolio days, worst first
    pub worst_days: Vec<(NaiveDate, f64)>,
}

fn worst(observed: &[(NaiveDate, f64)], n: usize) -> Vec<(NaiveDate, f64)> {
    let mut sorted = observed.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
    sorted.truncate(n);
    sorted
}

/// Attributes the portfolio's tail losses to positions.
///
/// Tail days are the observed portfolio days at or below the
/// `tail_pct / 100` quantile. Fewer than [`MIN_TAIL_DAYS`] such days
/// switches to the `worst_n` lowest days.
///
/// # Errors
///
/// - [`RiskError::InvalidConfidence`] if `tail_pct` is not in `(0, 100)`
/// - [`RiskError::InsufficientData`] below `min_observations` portfolio days
pub fn tail_contributors(
    matrix: &PnlMatrix,
    portfolio: &DatedSeries,
    config: &TailConfig,
) -> Result<TailAttribution, RiskError> {
    let p = config.tail_pct / 100.0;
    if !(p > 0.0 && p < 1.0) {
        return Err(RiskError::InvalidConfidence(p));
    }

    let observed = portfolio.observed();
    if observed.len() < config.min_observations.max(1) {
        return Err(RiskError::insufficient(config.min_observations, observed.len()));
    }

    let values: Vec<f64> = observed.iter().map(|(_, v)| *v).collect();
    let threshold = empirical_quantile(&values, p)
        .ok_or_else(|| RiskError::insufficient(1, 0))?;

    let mut tail_days: Vec<(NaiveDate, f64)> = observed
        .iter()
        .copied()
        .filter(|(_, v)| *v <= threshold)
        .collect();
    let used_worst_n = tail_days.len() < MIN_TAIL_DAYS;
    if used_worst_n {
        tail_days = worst(&observed, config.worst_n);
        tail_days.sort_by_key(|(d, _)| *d);
    }

    let total_tail_loss: f64 = tail_days.iter().map(|(_, v)| -v).sum();
    let rows: Vec<usize> = tail_days
        .iter()
        .filter_map(|(d, _)| matrix.dates().binary_search(d).ok())
        .collect();

    let mut contributors: Vec<TailContributor> = matrix
        .columns()
        .iter()
        .map(|column| {
            let tail: Vec<f64> = rows.iter().filter_map(|&r| column.values[r]).collect();
            let sum_pnl: f64 = tail.iter().sum();
            let avg_pnl = if tail.is_empty() {
                0.0
            } else {
                sum_pnl / tail.len() as f64
            };
            let loss_share = if total_tail_loss > 0.0 {
                -sum_pnl / total_tail_loss
            } else {
                0.0
            };
            TailContributor {
                name: column.name.clone(),
                avg_pnl,
                sum_pnl,
                loss_share,
            }
        })
        .collect();
    contributors.sort_by(|a, b| a.avg_pnl.total_cmp(&b.avg_pnl));

    debug!(
        threshold,
        tail_days = tail_days.len(),
        used_worst_n,
        total_tail_loss,
        "Tail attribution"
    );

    Ok(TailAttribution {
        threshold,
        tail_days,
        used_worst_n,
        total_tail_loss,
        contributors,
        worst_days: worst(&observed, config.worst_n),
    })
}
