//! Historical tail-risk metrics.
//!
//! Point estimators of Value-at-Risk and Expected Shortfall over a realised
//! PnL sample, with no distributional assumption.
//!
//! - [`historical_var`]: negated `(1 - alpha)` empirical quantile
//! - [`historical_es`]: negated mean of the sample at or below that quantile
//! - [`RiskReport`]: per-confidence summary with explicit insufficient-data state
//! - [`standalone_var_by_position`]: VaR of each PnL column on its own

mod report;
mod var;

pub use report::{risk_report, standalone_var_by_position, ReportStatus, RiskReport, StandaloneVar};
pub use var::{historical_es, historical_var, historical_var_es, MIN_OBSERVATIONS};
