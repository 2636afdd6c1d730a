//! VaR breach sequences.

use book_core::market_data::DatedSeries;
use chrono::NaiveDate;

/// Breach indicators on dates where both PnL and VaR are defined.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreachSequence {
    /// Dates of the intersection, ascending
    pub dates: Vec<NaiveDate>,
    /// `true` where realised PnL fell below `-VaR`
    pub breaches: Vec<bool>,
}

impl BreachSequence {
    /// Wraps a bare indicator sequence (no dates).
    pub fn from_indicators(breaches: Vec<bool>) -> Self {
        Self {
            dates: Vec::new(),
            breaches,
        }
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.breaches.len()
    }

    /// Returns `true` when there are no observations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.breaches.is_empty()
    }

    /// Number of breaches.
    pub fn breach_count(&self) -> usize {
        self.breaches.iter().filter(|b| **b).count()
    }

    /// Observed breach frequency; `None` for an empty sequence.
    pub fn breach_rate(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.breach_count() as f64 / self.len() as f64)
    }

    /// Dates on which a breach occurred.
    pub fn breach_dates(&self) -> Vec<NaiveDate> {
        self.dates
            .iter()
            .zip(&self.breaches)
            .filter(|(_, b)| **b)
            .map(|(d, _)| *d)
            .collect()
    }
}

/// Builds the breach sequence `pnl_t < -var_t`.
///
/// Aligned on the intersection of dates where both series are defined.
///
/// # Examples
///
/// ```
/// use book_core::market_data::DatedSeries;
/// use book_risk::backtest::breach_sequence;
/// use chrono::NaiveDate;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let pnl = DatedSeries::new(vec![d(1), d(2), d(3)], vec![Some(-5.0), Some(-1.0), Some(-9.0)]).unwrap();
/// let var = DatedSeries::new(vec![d(1), d(2), d(3)], vec![None, Some(2.0), Some(8.0)]).unwrap();
///
/// let seq = breach_sequence(&pnl, &var);
/// assert_eq!(seq.breaches, vec![false, true]);
/// ```
pub fn breach_sequence(pnl: &DatedSeries, var: &DatedSeries) -> BreachSequence {
    let (dates, breaches) = pnl
        .zip_observed(var)
        .into_iter()
        .map(|(date, p, v)| (date, p < -v))
        .unzip();
    BreachSequence { dates, breaches }
}
