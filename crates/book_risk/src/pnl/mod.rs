//! Factor-PnL engine.
//!
//! Maps a factor-move table through each enabled position's exposure into
//! a PnL matrix (one column per position) and a portfolio PnL series.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐
//! │  TradingBook  │   │ FactorSeries │
//! └──────┬────────┘   └──────┬───────┘
//!        └────────┬──────────┘
//!                 ▼
//!          pnl_matrix()  ── dropped positions (missing factor)
//!                 │
//!                 ▼
//!   PnlMatrix ──► portfolio()  (strict row-sum)
//! ```
//!
//! The unit of each factor column is implied by the asset class:
//! returns multiply USD notional exposure, basis-point changes multiply
//! DV01. Both reduce to `factor[t] * exposure_usd`.

mod matrix;

pub use matrix::{pnl_matrix, portfolio_pnl, PnlColumn, PnlMatrix, PortfolioPnl};
