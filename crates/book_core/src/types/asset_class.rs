//! Asset classes and their factor units.
//!
//! # Examples
//!
//! ```
//! use book_core::types::{AssetClass, FactorUnit};
//!
//! let class: AssetClass = " rates ".parse().unwrap();
//! assert_eq!(class, AssetClass::Rates);
//! assert_eq!(class.factor_unit(), FactorUnit::BasisPoint);
//! assert_eq!(AssetClass::Index.to_string(), "INDEX");
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::ValidationError;

/// Asset class of a position.
///
/// Selects both the exposure formula and the unit of the factor the
/// position is exposed to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum AssetClass {
    /// Single-name equity delta
    Eq,
    /// Foreign exchange delta
    Fx,
    /// Equity index delta or beta
    Index,
    /// Interest-rate DV01
    Rates,
}

/// Unit of a factor column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FactorUnit {
    /// Dimensionless return (typically log-return)
    Return,
    /// Change in basis points
    BasisPoint,
}

impl AssetClass {
    /// All asset classes in display order.
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Eq,
        AssetClass::Fx,
        AssetClass::Index,
        AssetClass::Rates,
    ];

    /// Returns the canonical upper-case code.
    pub fn code(&self) -> &'static str {
        match self {
            AssetClass::Eq => "EQ",
            AssetClass::Fx => "FX",
            AssetClass::Index => "INDEX",
            AssetClass::Rates => "RATES",
        }
    }

    /// Returns `true` for DV01-based positions.
    #[inline]
    pub fn is_rates(&self) -> bool {
        matches!(self, AssetClass::Rates)
    }

    /// Returns `true` for equity-like classes eligible for beta proxying.
    #[inline]
    pub fn is_equity_like(&self) -> bool {
        matches!(self, AssetClass::Eq | AssetClass::Index)
    }

    /// Unit of the factor this class is exposed to.
    #[inline]
    pub fn factor_unit(&self) -> FactorUnit {
        if self.is_rates() {
            FactorUnit::BasisPoint
        } else {
            FactorUnit::Return
        }
    }
}

impl FromStr for AssetClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EQ" => Ok(AssetClass::Eq),
            "FX" => Ok(AssetClass::Fx),
            "INDEX" => Ok(AssetClass::Index),
            "RATES" => Ok(AssetClass::Rates),
            _ => Err(ValidationError::UnknownAssetClass(s.trim().to_string())),
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
