//! Risk-limit monitoring.
//!
//! Compares VaR, ES and stress loss against desk limits. A metric at or
//! below [`NEAR_THRESHOLD`] of its limit is OK, up to the limit is Near,
//! above it is a breach. Undefined metrics are reported, never hidden.

use std::fmt;

use tracing::warn;

/// Fraction of a limit above which usage is flagged as near.
pub const NEAR_THRESHOLD: f64 = 0.8;

/// Usage state of one limit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LimitStatus {
    /// At most 80% of the limit
    Ok,
    /// Between 80% and 100% of the limit
    Near,
    /// Above the limit
    Breach,
    /// Metric undefined for the sample
    NotAvailable,
}

impl LimitStatus {
    /// Classifies `value` against `limit`.
    pub fn classify(value: Option<f64>, limit: f64) -> Self {
        match value {
            Some(v) if v.is_finite() => {
                if v <= NEAR_THRESHOLD * limit {
                    LimitStatus::Ok
                } else if v <= limit {
                    LimitStatus::Near
                } else {
                    LimitStatus::Breach
                }
            }
            _ => LimitStatus::NotAvailable,
        }
    }
}

impl fmt::Display for LimitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LimitStatus::Ok => "OK",
            LimitStatus::Near => "Near",
            LimitStatus::Breach => "BREACH",
            LimitStatus::NotAvailable => "n/a",
        };
        f.write_str(s)
    }
}

/// Desk limits in USD.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RiskLimits {
    /// One-day VaR limit
    pub var_limit: f64,
    /// One-day ES limit
    pub es_limit: f64,
    /// One-day stress loss limit
    pub stress_limit: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            var_limit: 2_000_000.0,
            es_limit: 2_500_000.0,
            stress_limit: 5_000_000.0,
        }
    }
}

/// One metric checked against its limit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimitCheck {
    /// Metric label
    pub metric: String,
    /// Metric value
    pub value: Option<f64>,
    /// Limit
    pub limit: f64,
    /// Usage state
    pub status: LimitStatus,
    /// `limit - value`
    pub headroom: Option<f64>,
}

impl LimitCheck {
    /// Builds a check for one metric.
    pub fn new(metric: impl Into<String>, value: Option<f64>, limit: f64) -> Self {
        let value = value.filter(|v| v.is_finite());
        Self {
            metric: metric.into(),
            value,
            limit,
            status: LimitStatus::classify(value, limit),
            headroom: value.map(|v| limit - v),
        }
    }

    /// Usage as a fraction of the limit.
    pub fn utilisation(&self) -> Option<f64> {
        self.value
            .filter(|_| self.limit != 0.0)
            .map(|v| v / self.limit)
    }
}

/// Checks VaR, ES and stress loss against `limits`.
///
/// Rows come back in that order. Breaches are logged at warn level.
///
/// # Examples
///
/// ```
/// use book_risk::limits::{check_limits, LimitStatus, RiskLimits};
///
/// let checks = check_limits(0.99, Some(1_500_000.0), Some(2_400_000.0), 6_000_000.0, &RiskLimits::default());
/// assert_eq!(checks[0].status, LimitStatus::Ok);
/// assert_eq!(checks[1].status, LimitStatus::Near);
/// assert_eq!(checks[2].status, LimitStatus::Breach);
/// ```
pub fn check_limits(
    alpha: f64,
    var: Option<f64>,
    es: Option<f64>,
    stress_loss: f64,
    limits: &RiskLimits,
) -> Vec<LimitCheck> {
    let pct = (alpha * 100.0).round();
    let checks = vec![
        LimitCheck::new(format!("VaR (1-day) @{pct}%"), var, limits.var_limit),
        LimitCheck::new(format!("ES (1-day) @{pct}%"), es, limits.es_limit),
        LimitCheck::new("Stress Loss (1-day)", Some(stress_loss), limits.stress_limit),
    ];
    for check in checks.iter().filter(|c| c.status == LimitStatus::Breach) {
        warn!(
            metric = %check.metric,
            value = ?check.value,
            limit = check.limit,
            "Risk limit breached"
        );
    }
    checks
}
