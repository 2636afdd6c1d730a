//! Out-of-sample rolling VaR/ES.

use book_core::market_data::DatedSeries;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::RiskError;
use crate::metrics::historical_var_es;
use crate::parallel::ParallelConfig;

/// Rolling VaR/ES keyed on the PnL series' own dates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollingRisk {
    /// Trailing window length in observations
    pub window: usize,
    /// Confidence level
    pub alpha: f64,
    /// VaR forecast per date; `None` where undefined
    pub var: DatedSeries,
    /// ES forecast per date; `None` where undefined
    pub es: DatedSeries,
}

impl RollingRisk {
    /// Number of dates with a defined VaR forecast.
    pub fn defined_count(&self) -> usize {
        self.var.observed_len()
    }

    /// Rows as `(date, var, es)` triples.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>, Option<f64>)> + '_ {
        self.var
            .iter()
            .zip(self.es.values().iter().copied())
            .map(|((date, var), es)| (date, var, es))
    }
}

/// Rolling VaR/ES with the default parallel configuration.
///
/// See [`rolling_var_es_with`].
pub fn rolling_var_es(
    pnl: &DatedSeries,
    window: usize,
    alpha: f64,
) -> Result<RollingRisk, RiskError> {
    rolling_var_es_with(pnl, window, alpha, &ParallelConfig::default())
}

/// Rolling historical VaR/ES from a strictly trailing window.
///
/// Missing PnL values are removed first. The forecast at the `i`-th
/// observed point uses exactly the `window` observed points before it,
/// never the point itself. Forecasts are then keyed back onto the input
/// dates; dates with fewer than `window` prior observations, missing
/// PnL, or a window too small for a decision-grade estimate are `None`.
///
/// # Errors
///
/// - [`RiskError::InvalidWindow`] if `window == 0`
/// - [`RiskError::InvalidConfidence`] if `alpha` is not in `(0, 1)`
pub fn rolling_var_es_with(
    pnl: &DatedSeries,
    window: usize,
    alpha: f64,
    parallel: &ParallelConfig,
) -> Result<RollingRisk, RiskError> {
    if window == 0 {
        return Err(RiskError::InvalidWindow(window));
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(RiskError::InvalidConfidence(alpha));
    }

    let observed: Vec<f64> = pnl.observed_values();
    let n = observed.len();
    let start = window.min(n);

    let forecasts: Vec<Option<(f64, f64)>> = parallel.map_range(start..n, |i| {
        historical_var_es(&observed[i - window..i], alpha).ok()
    });

    debug!(
        observations = n,
        window,
        alpha,
        forecasts = forecasts.iter().filter(|f| f.is_some()).count(),
        "Computed rolling VaR/ES"
    );

    // Observed-position lookup for each input row.
    let mut slot = vec![None; pnl.len()];
    let mut k = 0usize;
    for (row, value) in pnl.values().iter().enumerate() {
        if value.is_some() {
            if k >= start {
                slot[row] = forecasts[k - start];
            }
            k += 1;
        }
    }

    Ok(RollingRisk {
        window,
        alpha,
        var: pnl.map_rows(|row| slot[row].map(|(v, _)| v)),
        es: pnl.map_rows(|row| slot[row].map(|(_, e)| e)),
    })
}
