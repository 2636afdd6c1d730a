//! Deterministic factor-shock stress testing.
//!
//! Applies one-day shocks per asset class to the book's net factor
//! exposures. This is a scenario loss, not a VaR.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 run_stress                   │
//! ├──────────────────────────────────────────────┤
//! │  StressShocks  - EQ/INDEX %, FX %, RATES bp  │
//! │  FactorStress  - exposure x shock per factor │
//! │  StressResult  - rows, total, stress loss    │
//! └──────────────────────────────────────────────┘
//! ```

mod engine;

pub use engine::{
    run_stress, FactorStress, StressResult, StressShocks, DEFAULT_EQUITY_SHOCK_PCT,
    DEFAULT_FX_SHOCK_PCT, DEFAULT_RATES_SHOCK_BPS,
};
