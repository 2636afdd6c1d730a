//! Rolling VaR/ES backtesting.
//!
//! Produces an out-of-sample forecast series from the full PnL history and
//! tests the resulting breach sequence. There is no incremental state: the
//! whole report is re-derivable from the PnL series at any time.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  run_backtest                    │
//! ├──────────────────────────────────────────────────┤
//! │  rolling_var_es   - trailing-window forecasts   │
//! │  breach_sequence  - pnl_t < -VaR_t              │
//! │  kupiec_test      - unconditional coverage      │
//! │  christoffersen   - independence                │
//! │  conditional      - coverage + independence     │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Low Kupiec p-value: reject correct breach frequency. Low Christoffersen
//! p-value: breaches cluster, a volatility regime the VaR model misses.

mod breach;
mod coverage;
mod rolling;

pub use breach::{breach_sequence, BreachSequence};
pub use coverage::{
    christoffersen_test, conditional_coverage_test, kupiec_test, ChristoffersenResult,
    ConditionalCoverageResult, KupiecResult, PROB_EPSILON,
};
pub use rolling::{rolling_var_es, rolling_var_es_with, RollingRisk};

use std::fmt;

use book_core::market_data::DatedSeries;
use tracing::info;

use crate::error::RiskError;
use crate::parallel::ParallelConfig;

/// Default rolling window in trading days.
pub const DEFAULT_WINDOW: usize = 250;

/// Default backtest confidence level.
pub const DEFAULT_ALPHA: f64 = 0.99;

/// Backtest parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestConfig {
    /// Trailing window length
    pub window: usize,
    /// VaR confidence level
    pub alpha: f64,
    /// Parallel execution settings for the rolling loop
    pub parallel: ParallelConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            alpha: DEFAULT_ALPHA,
            parallel: ParallelConfig::default(),
        }
    }
}

impl BacktestConfig {
    /// Creates a configuration with default parallel settings.
    pub fn new(window: usize, alpha: f64) -> Self {
        Self {
            window,
            alpha,
            ..Self::default()
        }
    }
}

/// Full backtest output.
///
/// Each statistical test is `None` when undefined for the sample.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestReport {
    /// Rolling VaR/ES forecasts
    pub rolling: RollingRisk,
    /// Breach indicators on the defined dates
    pub breaches: BreachSequence,
    /// Unconditional coverage test
    pub kupiec: Option<KupiecResult>,
    /// Independence test
    pub christoffersen: Option<ChristoffersenResult>,
    /// Joint coverage and independence test
    pub conditional_coverage: Option<ConditionalCoverageResult>,
}

impl BacktestReport {
    /// Number of backtested observations.
    pub fn observations(&self) -> usize {
        self.breaches.len()
    }

    /// Breach frequency the model promises, `1 - alpha`.
    pub fn expected_breach_rate(&self) -> f64 {
        1.0 - self.rolling.alpha
    }

    /// Observed breach frequency.
    pub fn breach_rate(&self) -> Option<f64> {
        self.breaches.breach_rate()
    }

    /// Kupiec rejects correct coverage at `level`; `None` when undefined.
    pub fn reject_coverage(&self, level: f64) -> Option<bool> {
        self.kupiec.as_ref().map(|k| k.rejects(level))
    }

    /// Christoffersen rejects independence at `level`; `None` when undefined.
    pub fn reject_independence(&self, level: f64) -> Option<bool> {
        self.christoffersen.as_ref().map(|c| c.rejects(level))
    }

    /// Interprets both tests at `level`.
    pub fn verdict(&self, level: f64) -> BacktestVerdict {
        match (self.reject_coverage(level), self.reject_independence(level)) {
            (Some(false), Some(false)) => BacktestVerdict::Acceptable,
            (Some(true), Some(false)) => BacktestVerdict::WrongCoverage,
            (Some(false), Some(true)) => BacktestVerdict::Clustered,
            (Some(true), Some(true)) => BacktestVerdict::WrongCoverageAndClustered,
            _ => BacktestVerdict::Undefined,
        }
    }
}

/// Reading of a backtest at a significance level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BacktestVerdict {
    /// Neither test rejects
    Acceptable,
    /// Breach frequency inconsistent with `1 - alpha`
    WrongCoverage,
    /// Breaches cluster; the model misses volatility regimes
    Clustered,
    /// Both failures
    WrongCoverageAndClustered,
    /// Too few observations for either test
    Undefined,
}

impl fmt::Display for BacktestVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BacktestVerdict::Acceptable => "coverage and independence not rejected",
            BacktestVerdict::WrongCoverage => "breach frequency rejected",
            BacktestVerdict::Clustered => "breaches cluster (independence rejected)",
            BacktestVerdict::WrongCoverageAndClustered => {
                "breach frequency and independence rejected"
            }
            BacktestVerdict::Undefined => "insufficient data",
        };
        f.write_str(s)
    }
}

/// Runs the rolling forecast and all coverage tests.
///
/// # Errors
///
/// Only invalid parameters ([`RiskError::InvalidWindow`],
/// [`RiskError::InvalidConfidence`]) fail the run; undefined tests are
/// reported as `None`.
pub fn run_backtest(pnl: &DatedSeries, config: &BacktestConfig) -> Result<BacktestReport, RiskError> {
    let rolling = rolling_var_es_with(pnl, config.window, config.alpha, &config.parallel)?;
    let breaches = breach_sequence(pnl, &rolling.var);

    let kupiec = kupiec_test(&breaches, config.alpha).ok();
    let christoffersen = christoffersen_test(&breaches).ok();
    let conditional_coverage = conditional_coverage_test(&breaches, config.alpha).ok();

    info!(
        window = config.window,
        alpha = config.alpha,
        observations = breaches.len(),
        breaches = breaches.breach_count(),
        "Backtest complete"
    );

    Ok(BacktestReport {
        rolling,
        breaches,
        kupiec,
        christoffersen,
        conditional_coverage,
    })
}
