//! PnL attribution.
//!
//! Explains which positions drive the portfolio's worst days. Positions
//! whose average tail-day PnL is most negative come first; a loss share
//! above 100% means other positions offset part of the tail loss.

mod tail;

pub use tail::{tail_contributors, TailAttribution, TailConfig, TailContributor, MIN_TAIL_DAYS};
