//! # Book Risk (L2: Risk)
//!
//! Historical risk analytics for a linear multi-asset trading book.
//!
//! This crate provides:
//! - Factor PnL per position and for the portfolio
//! - Historical VaR and Expected Shortfall
//! - Rolling out-of-sample backtesting with Kupiec and Christoffersen tests
//! - Beta estimation and rule-driven hedge construction
//! - Deterministic stress shocks, limit monitoring and tail attribution
//! - Rayon-based parallelisation for independent rolling windows and rules
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             book_risk (L2)              │
//! ├─────────────────────────────────────────┤
//! │  pnl/         - PnL matrix, portfolio  │
//! │  metrics/     - VaR, ES, reports       │
//! │  backtest/    - rolling VaR, coverage  │
//! │  hedging/     - beta, hedges, effect   │
//! │  scenarios/   - stress shocks          │
//! │  limits/      - limit monitoring       │
//! │  attribution/ - tail contributors      │
//! │  parallel/    - Rayon utilities        │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │             book_core (L1)              │
//! │  Positions, book, factor series, stats  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Every result is a pure function of a book snapshot and a factor table.
//! Nothing is cached between calls.
//!
//! ## Example
//!
//! ```
//! use book_core::book::TradingBook;
//! use book_core::market_data::FactorSeries;
//! use book_core::types::{AssetClass, Position};
//! use book_risk::metrics::RiskReport;
//! use book_risk::pnl::portfolio_pnl;
//! use chrono::{Duration, NaiveDate};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dates: Vec<NaiveDate> = (0..100).map(|i| start + Duration::days(i)).collect();
//! let moves: Vec<Option<f64>> = (0..100).map(|i| Some((i as f64 - 50.0) / 5000.0)).collect();
//! let factors = FactorSeries::new(dates).unwrap().with_column(".SPX", moves).unwrap();
//!
//! let book = TradingBook::new(vec![
//!     Position::delta("SPX Beta", AssetClass::Index, ".SPX", 1_000_000.0, 1.0),
//! ]);
//! let pnl = portfolio_pnl(&book, &factors);
//! let report = RiskReport::compute(&pnl.series.observed_values(), 0.99).unwrap();
//! assert!(report.var.unwrap() > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod attribution;
pub mod backtest;
pub mod error;
pub mod hedging;
pub mod limits;
pub mod metrics;
pub mod parallel;
pub mod pnl;
pub mod scenarios;

pub use backtest::{run_backtest, BacktestConfig, BacktestReport, BacktestVerdict};
pub use error::RiskError;
pub use hedging::{build_hedges, hedge_effectiveness, HedgePlan};
pub use metrics::{historical_es, historical_var, RiskReport};
pub use parallel::{ParallelConfig, DEFAULT_BATCH_SIZE};
pub use pnl::{pnl_matrix, portfolio_pnl, PnlMatrix};
