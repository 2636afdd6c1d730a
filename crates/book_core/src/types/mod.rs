//! Position, asset-class and hedge-rule types.
//!
//! This module provides:
//! - `asset_class`: The four asset classes and the factor unit each one implies
//! - `position`: A single signed factor exposure and its raw boundary record
//! - `hedge_rule`: Hedge construction rules and their raw boundary record
//! - `error`: Validation errors raised while converting raw records
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`AssetClass`], [`FactorUnit`] from `asset_class`
//! - [`Position`], [`PositionRecord`] from `position`
//! - [`HedgeRule`], [`HedgeRuleRecord`] from `hedge_rule`
//! - [`ValidationError`] from `error`

pub mod asset_class;
pub mod error;
pub mod hedge_rule;
pub mod position;

pub use asset_class::{AssetClass, FactorUnit};
pub use error::ValidationError;
pub use hedge_rule::{HedgeRule, HedgeRuleRecord};
pub use position::{Position, PositionRecord};
