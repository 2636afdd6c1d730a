//! Before/after comparison of a hedged book.

use book_core::book::TradingBook;
use book_core::market_data::{DatedSeries, FactorSeries};
use book_core::math::correlation;
use book_core::types::{AssetClass, Position};
use tracing::debug;

use crate::error::RiskError;
use crate::metrics::RiskReport;
use crate::pnl::portfolio_pnl;

/// Aligned observations required before a correlation is reported.
pub const MIN_CORRELATION_OBSERVATIONS: usize = 30;

/// Risk of a book with and without its hedges.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HedgeEffectiveness {
    /// Confidence level
    pub alpha: f64,
    /// Book as loaded
    pub unhedged: RiskReport,
    /// Book plus hedges
    pub hedged: RiskReport,
    /// Hedges on their own
    pub hedge_only: RiskReport,
    /// `100 * (unhedged - hedged) / unhedged` VaR
    pub var_reduction_pct: Option<f64>,
    /// `100 * (unhedged - hedged) / unhedged` ES
    pub es_reduction_pct: Option<f64>,
    /// Correlation of hedge PnL with unhedged PnL
    pub corr_hedge_vs_unhedged: Option<f64>,
    /// Correlation of hedged PnL with unhedged PnL
    pub corr_hedged_vs_unhedged: Option<f64>,
    /// Sum of absolute notional over non-rates hedges
    pub gross_hedge_notional: f64,
    /// Sum of absolute DV01 over rates hedges
    pub gross_hedge_dv01: f64,
}

fn reduction_pct(before: Option<f64>, after: Option<f64>) -> Option<f64> {
    match (before, after) {
        (Some(b), Some(a)) if b.is_finite() && b != 0.0 => Some(100.0 * (b - a) / b),
        _ => None,
    }
}

fn aligned_correlation(a: &DatedSeries, b: &DatedSeries) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .zip_observed(b)
        .into_iter()
        .map(|(_, x, y)| (x, y))
        .unzip();
    if xs.len() < MIN_CORRELATION_OBSERVATIONS {
        return None;
    }
    correlation(&xs, &ys)
}

/// Compares the book's tail risk before and after appending `hedges`.
///
/// The hedged book is the enabled positions of `book` followed by
/// `hedges`. Reductions are `None` when either side is undefined or the
/// unhedged figure is zero.
///
/// # Errors
///
/// [`RiskError::InvalidConfidence`] if `alpha` is not in `(0, 1)`.
pub fn hedge_effectiveness(
    book: &TradingBook,
    hedges: &[Position],
    factors: &FactorSeries,
    alpha: f64,
) -> Result<HedgeEffectiveness, RiskError> {
    let hedged_book = book.with_positions(hedges.iter().cloned());
    let hedge_book: TradingBook = hedges.iter().cloned().collect();

    let unhedged_pnl = portfolio_pnl(book, factors).series;
    let hedged_pnl = portfolio_pnl(&hedged_book, factors).series;
    let hedge_pnl = portfolio_pnl(&hedge_book, factors).series;

    let unhedged = RiskReport::compute(&unhedged_pnl.observed_values(), alpha)?;
    let hedged = RiskReport::compute(&hedged_pnl.observed_values(), alpha)?;
    let hedge_only = RiskReport::compute(&hedge_pnl.observed_values(), alpha)?;

    let (gross_hedge_notional, gross_hedge_dv01) =
        hedges
            .iter()
            .fold((0.0, 0.0), |(notional, dv01), h| match h.asset_class {
                AssetClass::Rates => (notional, dv01 + h.dv01_usd_per_bp.abs()),
                _ => (notional + h.notional_usd.abs(), dv01),
            });

    debug!(
        alpha,
        hedges = hedges.len(),
        unhedged_var = ?unhedged.var,
        hedged_var = ?hedged.var,
        "Hedge effectiveness"
    );

    Ok(HedgeEffectiveness {
        alpha,
        var_reduction_pct: reduction_pct(unhedged.var, hedged.var),
        es_reduction_pct: reduction_pct(unhedged.es, hedged.es),
        corr_hedge_vs_unhedged: aligned_correlation(&hedge_pnl, &unhedged_pnl),
        corr_hedged_vs_unhedged: aligned_correlation(&hedged_pnl, &unhedged_pnl),
        unhedged,
        hedged,
        hedge_only,
        gross_hedge_notional,
        gross_hedge_dv01,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hedging::build_hedges;
    use book_core::types::HedgeRule;
    use chrono::{Duration, NaiveDate};

    fn factors(n: usize) -> FactorSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let dates = (0..n as i64).map(|i| start + Duration::days(i)).collect();
        let spx = (0..n)
            .map(|i| Some(((i * 7919) % 101) as f64 / 2000.0 - 0.025))
            .collect();
        let tnx = (0..n)
            .map(|i| Some(((i * 104_729) % 41) as f64 / 2.0 - 10.0))
            .collect();
        FactorSeries::new(dates)
            .unwrap()
            .with_column(".SPX", spx)
            .unwrap()
            .with_column(".TNX", tnx)
            .unwrap()
    }

    fn book() -> TradingBook {
        TradingBook::new(vec![
            Position::delta("SPX Beta", AssetClass::Index, ".SPX", 2_000_000.0, 1.0),
            Position::dv01("Rates 10Y", ".TNX", 10_000.0),
        ])
    }

    #[test]
    fn test_full_hedge_removes_risk() {
        let rules = vec![
            HedgeRule::new("HEDGE_SPX", ".SPX", ".SPX", AssetClass::Index),
            HedgeRule::new("HEDGE_TNX", ".TNX", ".TNX", AssetClass::Rates),
        ];
        let plan = build_hedges(&book(), &rules, None);
        let eff = hedge_effectiveness(&book(), &plan.positions(), &factors(300), 0.99).unwrap();

        assert!(eff.unhedged.var.unwrap() > 0.0);
        assert!(eff.hedged.var.unwrap().abs() < 1e-6);
        let reduction = eff.var_reduction_pct.unwrap();
        assert!((reduction - 100.0).abs() < 1e-6);
        assert_eq!(eff.gross_hedge_notional, 2_000_000.0);
        assert_eq!(eff.gross_hedge_dv01, 10_000.0);
        let corr = eff.corr_hedge_vs_unhedged.unwrap();
        assert!((corr + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_hedges() {
        let eff = hedge_effectiveness(&book(), &[], &factors(300), 0.95).unwrap();
        assert_eq!(eff.unhedged, eff.hedged);
        assert_eq!(eff.var_reduction_pct, Some(0.0));
        assert_eq!(eff.hedge_only.var, None);
        assert_eq!(eff.corr_hedge_vs_unhedged, None);
    }

    #[test]
    fn test_short_history_undefined() {
        let eff = hedge_effectiveness(&book(), &[], &factors(20), 0.99).unwrap();
        assert_eq!(eff.unhedged.var, None);
        assert_eq!(eff.var_reduction_pct, None);
        assert_eq!(eff.corr_hedged_vs_unhedged, None);
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(matches!(
            hedge_effectiveness(&book(), &[], &factors(50), 1.5),
            Err(RiskError::InvalidConfidence(_))
        ));
    }
}
