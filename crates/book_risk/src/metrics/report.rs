//! Risk reports per confidence level.

use crate::error::RiskError;
use crate::parallel::ParallelConfig;
use crate::pnl::PnlMatrix;

use super::var::historical_var_es;

/// Whether a report carries decision-grade numbers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportStatus {
    /// VaR and ES are both defined
    Defined,
    /// Sample below the minimum size (or an empty tail)
    InsufficientData,
}

/// VaR/ES at one confidence level with the sample size behind them.
///
/// `None` metrics mean "not enough information", never "no risk".
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskReport {
    /// Confidence level
    pub alpha: f64,
    /// Historical VaR (positive = loss)
    pub var: Option<f64>,
    /// Historical ES (positive = loss)
    pub es: Option<f64>,
    /// Finite observations in the sample
    pub sample_size: usize,
}

impl RiskReport {
    /// Computes a report for one confidence level.
    ///
    /// # Errors
    ///
    /// Only [`RiskError::InvalidConfidence`] is returned; insufficient
    /// data is folded into `None` metrics.
    pub fn compute(sample: &[f64], alpha: f64) -> Result<Self, RiskError> {
        let sample_size = sample.iter().filter(|x| x.is_finite()).count();
        let (var, es) = match historical_var_es(sample, alpha) {
            Ok((v, e)) => (Some(v), Some(e)),
            Err(e) if e.is_insufficient_data() => (None, None),
            Err(e) => return Err(e),
        };
        Ok(Self {
            alpha,
            var,
            es,
            sample_size,
        })
    }

    /// Report status.
    pub fn status(&self) -> ReportStatus {
        if self.var.is_some() && self.es.is_some() {
            ReportStatus::Defined
        } else {
            ReportStatus::InsufficientData
        }
    }
}

/// One report per requested confidence level, in input order.
pub fn risk_report(sample: &[f64], alphas: &[f64]) -> Result<Vec<RiskReport>, RiskError> {
    alphas
        .iter()
        .map(|&alpha| RiskReport::compute(sample, alpha))
        .collect()
}

/// Stand-alone VaR of one position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandaloneVar {
    /// Position name
    pub name: String,
    /// VaR of the position's own PnL column
    pub var: Option<f64>,
    /// Observed PnL values in the column
    pub sample_size: usize,
}

/// VaR of each PnL column taken on its own.
///
/// This is not a decomposition: the values do not sum to portfolio VaR.
pub fn standalone_var_by_position(
    matrix: &PnlMatrix,
    alpha: f64,
) -> Result<Vec<StandaloneVar>, RiskError> {
    ParallelConfig::default()
        .map_slice(matrix.columns(), |column| {
            let sample: Vec<f64> = column.values.iter().flatten().copied().collect();
            let report = RiskReport::compute(&sample, alpha)?;
            Ok(StandaloneVar {
                name: column.name.clone(),
                var: report.var,
                sample_size: report.sample_size,
            })
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pnl::pnl_matrix;
    use book_core::book::TradingBook;
    use book_core::market_data::FactorSeries;
    use book_core::types::{AssetClass, Position};
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_report_insufficient() {
        let report = RiskReport::compute(&[5_000.0, -10_000.0, 2_500.0], 0.95).unwrap();
        assert_eq!(report.var, None);
        assert_eq!(report.es, None);
        assert_eq!(report.sample_size, 3);
        assert_eq!(report.status(), ReportStatus::InsufficientData);
    }

    #[test]
    fn test_report_defined() {
        let sample: Vec<f64> = (0..100).map(|i| i as f64 - 50.0).collect();
        let reports = risk_report(&sample, &[0.95, 0.99]).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].alpha, 0.95);
        assert!(reports.iter().all(|r| r.status() == ReportStatus::Defined));
        assert!(reports[1].var.unwrap() >= reports[0].var.unwrap());
    }

    #[test]
    fn test_report_invalid_alpha_propagates() {
        let err = risk_report(&[1.0; 40], &[0.99, 2.0]).unwrap_err();
        assert_eq!(err, RiskError::InvalidConfidence(2.0));
    }

    #[test]
    fn test_standalone_var() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..60).map(|i| start + Duration::days(i)).collect();
        let moves: Vec<Option<f64>> = (0..60).map(|i| Some((i as f64 - 30.0) / 1000.0)).collect();
        let factors = FactorSeries::new(dates)
            .unwrap()
            .with_column("A", moves)
            .unwrap();
        let book = TradingBook::new(vec![
            Position::delta("Long", AssetClass::Eq, "A", 1_000_000.0, 1.0),
            Position::delta("Short", AssetClass::Eq, "A", -1_000_000.0, 1.0),
        ]);

        let out = standalone_var_by_position(&pnl_matrix(&book, &factors), 0.95).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].sample_size, 60);
        let long = out[0].var.unwrap();
        let short = out[1].var.unwrap();
        assert!(long > 0.0);
        assert!(short > 0.0);
    }
}
