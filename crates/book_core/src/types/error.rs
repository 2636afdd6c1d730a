//! Validation errors for raw book input.
//!
//! Raw position and hedge-rule records are checked once when they cross
//! into the core. Everything downstream assumes validated values.

use thiserror::Error;

/// Errors raised while converting a raw record into a validated type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Asset class string is not one of EQ, FX, INDEX, RATES.
    #[error("Unknown asset class: {0}")]
    UnknownAssetClass(String),

    /// Position name is empty after trimming.
    #[error("Position name is empty")]
    EmptyName,

    /// Factor identifier is empty after trimming.
    #[error("Factor id is empty for '{0}'")]
    EmptyFactorId(String),

    /// A numeric field is NaN or infinite.
    #[error("Non-finite value in field '{field}' for '{name}'")]
    NonFiniteValue {
        /// Record name
        name: String,
        /// Offending field
        field: &'static str,
    },
}
