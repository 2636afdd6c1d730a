//! Integration tests for the risk pipeline.
//!
//! These tests run book snapshots and factor tables through PnL, VaR/ES,
//! backtesting, hedging, stress and limits end to end.

use approx::assert_relative_eq;
use book_core::book::TradingBook;
use book_core::market_data::{
    DatedSeries, FactorSeries, FactorTransform, FillPolicy, QuoteMode,
};
use book_core::types::{AssetClass, HedgeRule, Position};
use book_risk::backtest::{run_backtest, BacktestConfig};
use book_risk::hedging::{beta_weighted_exposure, build_hedges, hedge_effectiveness};
use book_risk::limits::{check_limits, LimitStatus, RiskLimits};
use book_risk::metrics::{risk_report, ReportStatus};
use book_risk::pnl::{pnl_matrix, portfolio_pnl};
use book_risk::scenarios::{run_stress, StressShocks};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (0..n as i64).map(|i| start + Duration::days(i)).collect()
}

fn normal_pnl(seed: u64, n: usize, vols: &[(usize, f64)]) -> DatedSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let values = (0..n)
        .map(|i| {
            let vol = vols
                .iter()
                .rev()
                .find(|(from, _)| i >= *from)
                .map_or(1.0, |(_, v)| *v);
            vol * 10_000.0 * rng.sample(normal)
        })
        .collect();
    DatedSeries::from_values(dates(n), values).unwrap()
}

/// Simulated level table: two equities, an index and a yield quoted x10.
fn levels(n: usize) -> FactorSeries {
    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let (mut spx, mut aapl, mut eur, mut tnx) = (4_000.0_f64, 150.0_f64, 1.10_f64, 42.0_f64);
    let mut cols: [Vec<Option<f64>>; 4] = Default::default();
    for i in 0..n {
        let m: f64 = rng.sample(normal);
        spx *= (0.01 * m).exp();
        aapl *= (0.012 * m + 0.008 * rng.sample::<f64, _>(normal)).exp();
        eur *= (0.005 * rng.sample::<f64, _>(normal)).exp();
        tnx += 0.5 * rng.sample::<f64, _>(normal);
        cols[0].push(Some(spx));
        // A few holidays on the single name.
        cols[1].push((i % 97 != 50).then_some(aapl));
        cols[2].push(Some(eur));
        cols[3].push(Some(tnx));
    }
    let [spx, aapl, eur, tnx] = cols;
    FactorSeries::new(dates(n))
        .unwrap()
        .with_column(".SPX", spx)
        .unwrap()
        .with_column("AAPL.O", aapl)
        .unwrap()
        .with_column("EUR=", eur)
        .unwrap()
        .with_column(".TNX", tnx)
        .unwrap()
}

fn desk_book() -> TradingBook {
    TradingBook::new(vec![
        Position::delta("AAPL Delta", AssetClass::Eq, "AAPL.O", 1_000_000.0, 0.55),
        Position::delta("SPX Beta", AssetClass::Index, ".SPX", 2_000_000.0, 1.0),
        Position::delta("FX EURUSD", AssetClass::Fx, "EUR=", 500_000.0, 1.0),
        Position::dv01("Rates 10Y", ".TNX", 12_000.0),
    ])
}

fn desk_factors(n: usize) -> FactorSeries {
    let book = desk_book();
    let classes: Vec<(String, AssetClass)> = book
        .positions()
        .iter()
        .map(|p| (p.factor_id.clone(), p.asset_class))
        .collect();
    FactorSeries::from_levels(&levels(n), FillPolicy::ForwardFill, |id| {
        classes
            .iter()
            .find(|(f, _)| f == id)
            .map(|(_, c)| FactorTransform::for_asset_class(*c, QuoteMode::CboeX10))
    })
    .unwrap()
}

// ============================================================================
// End-to-End Pipeline Tests
// ============================================================================

/// Levels to returns to PnL to VaR, with the holiday gap forward-filled.
#[test]
fn test_levels_to_risk_report() {
    let factors = desk_factors(600);
    assert_eq!(factors.n_factors(), 4);

    let matrix = pnl_matrix(&desk_book(), &factors);
    assert_eq!(matrix.n_columns(), 4);
    assert!(matrix.dropped().is_empty());

    let pnl = matrix.portfolio();
    // Only the first row lacks a prior level.
    assert_eq!(pnl.observed_len(), 599);

    let reports = risk_report(&pnl.observed_values(), &[0.95, 0.99]).unwrap();
    assert!(reports.iter().all(|r| r.status() == ReportStatus::Defined));
    let (r95, r99) = (&reports[0], &reports[1]);
    assert!(r99.var.unwrap() >= r95.var.unwrap());
    assert!(r95.es.unwrap() >= r95.var.unwrap());
}

#[test]
fn test_dropped_position_excluded_from_portfolio() {
    let factors = desk_factors(100);
    let book = desk_book().with_positions(vec![Position::delta(
        "NDX",
        AssetClass::Index,
        ".NDX",
        1_000_000.0,
        1.0,
    )]);
    let with_extra = portfolio_pnl(&book, &factors);
    let base = portfolio_pnl(&desk_book(), &factors);
    assert_eq!(with_extra.dropped, vec!["NDX".to_string()]);
    assert_eq!(with_extra.series, base.series);
}

// ============================================================================
// Backtest Calibration Tests
// ============================================================================

/// Rolling historical VaR on i.i.d. normal PnL should pass Kupiec in most
/// seeds.
#[test]
fn test_kupiec_accepts_iid_normal() {
    let config = BacktestConfig::new(250, 0.95);
    let accepted = (0..20u64)
        .filter(|seed| {
            let report = run_backtest(&normal_pnl(*seed, 1250, &[]), &config).unwrap();
            assert_eq!(report.observations(), 1000);
            !report.kupiec.unwrap().rejects(0.05)
        })
        .count();
    assert!(accepted >= 12, "accepted {} of 20", accepted);
}

/// A tripling of volatility the window has not seen produces far too many
/// breaches.
#[test]
fn test_kupiec_rejects_vol_regime_shift() {
    let pnl = normal_pnl(11, 1250, &[(750, 3.0)]);
    let report = run_backtest(&pnl, &BacktestConfig::new(250, 0.95)).unwrap();
    let kupiec = report.kupiec.unwrap();
    assert!(kupiec.breach_count as f64 > kupiec.expected_breaches);
    assert!(kupiec.rejects(0.05), "p = {}", kupiec.p_value);
}

#[test]
fn test_backtest_window_too_long() {
    let report = run_backtest(&normal_pnl(1, 200, &[]), &BacktestConfig::new(250, 0.99)).unwrap();
    assert_eq!(report.rolling.defined_count(), 0);
    assert!(report.kupiec.is_none());
    assert!(report.christoffersen.is_none());
}

// ============================================================================
// Hedging Tests
// ============================================================================

#[test]
fn test_hedge_plan_reduces_var() {
    let factors = desk_factors(500);
    let rules = vec![
        HedgeRule::new("HEDGE_SPX", ".SPX", ".SPX", AssetClass::Index).with_beta_proxy(true),
        HedgeRule::new("HEDGE_EUR", "EUR=", "EUR=", AssetClass::Fx),
        HedgeRule::new("HEDGE_TNX", ".TNX", ".TNX", AssetClass::Rates),
    ];
    let plan = build_hedges(&desk_book(), &rules, Some(&factors));
    assert_eq!(plan.hedges.len(), 3);
    assert!(plan.hedges[0].beta_proxy_used);

    let hedged = desk_book().with_positions(plan.positions());
    assert!(hedged.net_exposure("EUR=").abs() < 1e-6);
    assert!(hedged.net_exposure(".TNX").abs() < 1e-6);
    let residual = beta_weighted_exposure(&hedged, ".SPX", &factors).unwrap();
    assert!(residual.abs() < 1e-3, "residual beta exposure {}", residual);

    let eff = hedge_effectiveness(&desk_book(), &plan.positions(), &factors, 0.99).unwrap();
    assert!(eff.var_reduction_pct.unwrap() > 0.0);
    assert_relative_eq!(eff.gross_hedge_dv01, 12_000.0);
    assert_relative_eq!(eff.gross_hedge_notional, plan.hedges[0].position.notional_usd.abs() + 500_000.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Uncapped hedges neutralise each target factor.
    #[test]
    fn prop_uncapped_hedges_neutralise(
        eq in -1.0e7..1.0e7f64,
        eq_mult in 0.1..5.0f64,
        fx in -1.0e7..1.0e7f64,
        dv01 in -1.0e5..1.0e5f64,
        hedge_mult in 0.5..10.0f64,
    ) {
        let book = TradingBook::new(vec![
            Position::delta("EQ", AssetClass::Eq, "A", eq, eq_mult),
            Position::delta("FX", AssetClass::Fx, "F", fx, 1.0),
            Position::dv01("IR", "R", dv01),
        ]);
        let rules = vec![
            HedgeRule::new("HA", "A", "A", AssetClass::Eq).with_multiplier(hedge_mult),
            HedgeRule::new("HF", "F", "F", AssetClass::Fx),
            HedgeRule::new("HR", "R", "R", AssetClass::Rates),
        ];
        let hedged = book.with_positions(build_hedges(&book, &rules, None).positions());
        for (id, before) in [("A", eq * eq_mult), ("F", fx), ("R", dv01)] {
            let after = hedged.net_exposure(id);
            prop_assert!(after.abs() <= 1e-9 * (1.0 + before.abs()), "{}: {} -> {}", id, before, after);
        }
    }

    /// A capped hedge never exceeds its cap and never overshoots.
    #[test]
    fn prop_capped_hedge_bounded(
        exposure in -1.0e7..1.0e7f64,
        cap in 1.0..5.0e6f64,
    ) {
        let book = TradingBook::new(vec![Position::delta("X", AssetClass::Index, "X", exposure, 1.0)]);
        let rule = HedgeRule::new("H", "X", "X", AssetClass::Index).with_max_abs_notional(cap);
        let plan = build_hedges(&book, &[rule], None);
        if let Some(h) = plan.hedges.first() {
            prop_assert!(h.position.notional_usd.abs() <= cap);
            let after = book.with_positions(plan.positions()).net_exposure("X");
            prop_assert!(after.abs() <= exposure.abs() + 1e-9);
            prop_assert!(after * exposure >= 0.0);
        }
    }
}

// ============================================================================
// Stress and Limits Tests
// ============================================================================

#[test]
fn test_stress_feeds_limits() {
    let factors = desk_factors(300);
    let pnl = portfolio_pnl(&desk_book(), &factors).series;
    let reports = risk_report(&pnl.observed_values(), &[0.99]).unwrap();

    let shocks = StressShocks {
        rates_bps: -100.0,
        ..StressShocks::default()
    };
    let stress = run_stress(&desk_book(), &shocks);
    // EQ -255k, FX +25k, rates -1.2mm
    assert_relative_eq!(stress.total_pnl, -1_430_000.0, epsilon = 1e-6);

    let limits = RiskLimits {
        stress_limit: 1_000_000.0,
        ..RiskLimits::default()
    };
    let checks = check_limits(0.99, reports[0].var, reports[0].es, stress.stress_loss(), &limits);
    assert_eq!(checks.len(), 3);
    assert_eq!(checks[2].status, LimitStatus::Breach);
    assert_relative_eq!(checks[2].headroom.unwrap(), -430_000.0, epsilon = 1e-6);
    assert_ne!(checks[0].status, LimitStatus::NotAvailable);
}
