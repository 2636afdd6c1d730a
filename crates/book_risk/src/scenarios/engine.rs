//! Deterministic one-day stress execution.

use std::collections::BTreeMap;

use book_core::book::TradingBook;
use book_core::types::AssetClass;
use tracing::debug;

/// Default equity and index shock in percent.
pub const DEFAULT_EQUITY_SHOCK_PCT: f64 = -10.0;
/// Default FX shock in percent.
pub const DEFAULT_FX_SHOCK_PCT: f64 = 5.0;
/// Default rates shock in basis points.
pub const DEFAULT_RATES_SHOCK_BPS: f64 = 100.0;

/// One-day factor shocks per asset class.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StressShocks {
    /// EQ and INDEX return shock, percent
    pub equity_pct: f64,
    /// FX return shock, percent
    pub fx_pct: f64,
    /// Rates level shock, basis points
    pub rates_bps: f64,
}

impl Default for StressShocks {
    fn default() -> Self {
        Self {
            equity_pct: DEFAULT_EQUITY_SHOCK_PCT,
            fx_pct: DEFAULT_FX_SHOCK_PCT,
            rates_bps: DEFAULT_RATES_SHOCK_BPS,
        }
    }
}

impl StressShocks {
    /// Factor move applied to a factor of the given asset class.
    ///
    /// Percent shocks become decimal returns; rates stay in basis points.
    pub fn factor_move(&self, asset_class: AssetClass) -> f64 {
        match asset_class {
            AssetClass::Eq | AssetClass::Index => self.equity_pct / 100.0,
            AssetClass::Fx => self.fx_pct / 100.0,
            AssetClass::Rates => self.rates_bps,
        }
    }
}

/// Stressed PnL of one factor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactorStress {
    /// Factor identifier
    pub factor_id: String,
    /// Net USD exposure to the factor
    pub exposure: f64,
    /// Applied factor move
    pub shock: f64,
    /// `exposure * shock`
    pub pnl: f64,
}

impl FactorStress {
    /// Check if the factor loses under the shock.
    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}

/// Result of a stress run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StressResult {
    /// Per-factor rows, worst first
    pub rows: Vec<FactorStress>,
    /// Sum of row PnL
    pub total_pnl: f64,
}

impl StressResult {
    /// Loss figure compared against limits, `max(0, -total_pnl)`.
    pub fn stress_loss(&self) -> f64 {
        (-self.total_pnl).max(0.0)
    }

    /// Worst factor, if any.
    pub fn worst(&self) -> Option<&FactorStress> {
        self.rows.first()
    }
}

/// Applies `shocks` to the book's net factor exposures.
///
/// The shock for a factor follows the asset class of the enabled positions
/// that reference it; when several classes share a factor the last
/// position wins.
///
/// # Examples
///
/// ```
/// use book_core::book::TradingBook;
/// use book_core::types::{AssetClass, Position};
/// use book_risk::scenarios::{run_stress, StressShocks};
///
/// let book = TradingBook::new(vec![
///     Position::delta("SPX", AssetClass::Index, ".SPX", 1_000_000.0, 1.0),
///     Position::dv01("10Y", ".TNX", 1_000.0),
/// ]);
/// let result = run_stress(&book, &StressShocks::default());
/// assert_eq!(result.total_pnl, 0.0);
/// assert_eq!(result.rows[0].factor_id, ".SPX");
/// ```
pub fn run_stress(book: &TradingBook, shocks: &StressShocks) -> StressResult {
    let classes: BTreeMap<&str, AssetClass> = book
        .enabled_positions()
        .map(|p| (p.factor_id.as_str(), p.asset_class))
        .collect();

    let mut rows: Vec<FactorStress> = book
        .net_exposure_by_factor()
        .into_iter()
        .map(|(factor_id, exposure)| {
            let shock = classes
                .get(factor_id.as_str())
                .map_or(0.0, |class| shocks.factor_move(*class));
            FactorStress {
                pnl: exposure * shock,
                factor_id,
                exposure,
                shock,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.pnl.total_cmp(&b.pnl));

    let total_pnl = rows.iter().map(|r| r.pnl).sum();
    debug!(factors = rows.len(), total_pnl, "Stress run complete");
    StressResult { rows, total_pnl }
}
