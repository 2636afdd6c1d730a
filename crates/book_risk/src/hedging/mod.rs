//! Rule-driven hedge construction.
//!
//! Each [`HedgeRule`] neutralises the book's exposure to one factor by
//! sizing an opposite position on a hedge instrument. Rates hedges are
//! sized in DV01; everything else in notional, optionally capped.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 build_hedges                    │
//! ├─────────────────────────────────────────────────┤
//! │  net exposure ──┐                               │
//! │  beta proxy  ───┼─► size ─► cap ─► HedgePlan    │
//! │  (estimate_beta)│                               │
//! └─────────────────┴───────────────────────────────┘
//!                          │
//!                          ▼
//!               hedge_effectiveness
//! ```
//!
//! A clamped hedge only partially neutralises its target; it is flagged
//! on [`HedgePosition::clamped`].

mod beta;
mod effectiveness;
mod engine;

pub use beta::{beta, estimate_beta, BetaEstimate, MIN_BETA_OBSERVATIONS};
pub use book_core::types::HedgeRule;
pub use effectiveness::{hedge_effectiveness, HedgeEffectiveness, MIN_CORRELATION_OBSERVATIONS};
pub use engine::{
    beta_weighted_exposure, build_hedges, build_hedges_with, HedgePlan, HedgePosition, SkipReason,
    SkippedRule, NEGLIGIBLE_EXPOSURE,
};
