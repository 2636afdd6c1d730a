//! Risk computation error types.
//!
//! Insufficient data is an expected outcome, not a failure of the engine:
//! callers receive it as a typed value carrying the observed sample size
//! so "no risk" and "not enough information" stay distinguishable.

use book_core::market_data::FactorSeriesError;
use thiserror::Error;

/// Errors returned by risk metrics, backtests and attribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// Sample too small for a decision-grade estimate.
    #[error("Insufficient data: observed {observed}, required {required}")]
    InsufficientData {
        /// Minimum sample size
        required: usize,
        /// Usable observations found
        observed: usize,
    },

    /// Confidence level outside (0, 1).
    #[error("Invalid confidence level: {0} (must be in (0, 1))")]
    InvalidConfidence(f64),

    /// Rolling window of zero length.
    #[error("Invalid window: {0}")]
    InvalidWindow(usize),

    /// No observation at or below the quantile.
    #[error("Empty tail: no observations at or below the quantile")]
    EmptyTail,

    /// Factor series construction error.
    #[error("Series error: {0}")]
    Series(#[from] FactorSeriesError),
}

impl RiskError {
    /// Shorthand for [`RiskError::InsufficientData`].
    pub fn insufficient(required: usize, observed: usize) -> Self {
        Self::InsufficientData { required, observed }
    }

    /// Returns `true` for insufficient-data outcomes.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::EmptyTail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_insufficient() {
        let err = RiskError::insufficient(30, 3);
        assert_eq!(
            format!("{}", err),
            "Insufficient data: observed 3, required 30"
        );
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_error_display_confidence() {
        let err = RiskError::InvalidConfidence(1.5);
        assert_eq!(
            format!("{}", err),
            "Invalid confidence level: 1.5 (must be in (0, 1))"
        );
        assert!(!err.is_insufficient_data());
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(RiskError::EmptyTail);
        assert!(err.to_string().contains("tail"));
    }
}
