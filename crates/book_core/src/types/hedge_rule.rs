//! Hedge construction rules.
//!
//! A [`HedgeRule`] says which factor to neutralise and with which
//! instrument. Rules are ephemeral: they are built per risk run and
//! never persisted.

use super::asset_class::AssetClass;
use super::error::ValidationError;

/// Specification of one hedge.
///
/// # Examples
///
/// ```
/// use book_core::types::{AssetClass, HedgeRule};
///
/// let rule = HedgeRule::new("SPX Hedge", ".SPX", ".SPX", AssetClass::Index)
///     .with_max_abs_notional(10_000_000.0)
///     .with_beta_proxy(true);
/// assert_eq!(rule.cap(), Some(10_000_000.0));
/// assert_eq!(rule.effective_multiplier(), 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HedgeRule {
    /// Name given to the generated hedge position
    pub hedge_name: String,
    /// Factor whose net exposure is neutralised
    pub target_factor_id: String,
    /// Factor of the hedge instrument
    pub hedge_factor_id: String,
    /// Asset class of the hedge instrument
    pub hedge_asset_class: AssetClass,
    /// Multiplier of the hedge instrument (zero reads as 1.0)
    pub hedge_multiplier: f64,
    /// Absolute notional cap for non-RATES hedges
    pub max_abs_notional: Option<f64>,
    /// Size against beta-weighted equity exposure instead of plain exposure
    pub use_beta_proxy: bool,
    /// Disabled rules are skipped
    pub enabled: bool,
}

impl HedgeRule {
    /// Creates an enabled rule with multiplier 1.0, no cap and no proxy.
    pub fn new(
        hedge_name: impl Into<String>,
        target_factor_id: impl Into<String>,
        hedge_factor_id: impl Into<String>,
        hedge_asset_class: AssetClass,
    ) -> Self {
        Self {
            hedge_name: hedge_name.into(),
            target_factor_id: target_factor_id.into(),
            hedge_factor_id: hedge_factor_id.into(),
            hedge_asset_class,
            hedge_multiplier: 1.0,
            max_abs_notional: None,
            use_beta_proxy: false,
            enabled: true,
        }
    }

    /// Sets the hedge instrument multiplier.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.hedge_multiplier = multiplier;
        self
    }

    /// Sets the absolute notional cap.
    pub fn with_max_abs_notional(mut self, cap: f64) -> Self {
        self.max_abs_notional = Some(cap);
        self
    }

    /// Enables or disables beta-proxy sizing.
    pub fn with_beta_proxy(mut self, use_beta_proxy: bool) -> Self {
        self.use_beta_proxy = use_beta_proxy;
        self
    }

    /// Enables or disables the rule.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Multiplier used for sizing; zero is treated as 1.0.
    #[inline]
    pub fn effective_multiplier(&self) -> f64 {
        if self.hedge_multiplier == 0.0 {
            1.0
        } else {
            self.hedge_multiplier
        }
    }

    /// Effective notional cap. Non-positive caps mean uncapped.
    #[inline]
    pub fn cap(&self) -> Option<f64> {
        self.max_abs_notional.filter(|c| *c > 0.0)
    }
}

/// Raw hedge-rule row.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HedgeRuleRecord {
    /// Enabled flag
    #[cfg_attr(feature = "serde", serde(default))]
    pub enabled: Option<bool>,
    /// Hedge position name (blank reads as "HEDGE")
    #[cfg_attr(feature = "serde", serde(default))]
    pub hedge_name: String,
    /// Target factor id
    pub target_factor_id: String,
    /// Hedge factor id
    pub hedge_factor_id: String,
    /// Hedge asset class code (blank reads as INDEX)
    #[cfg_attr(feature = "serde", serde(default))]
    pub hedge_asset_class: String,
    /// Hedge multiplier
    #[cfg_attr(feature = "serde", serde(default))]
    pub hedge_multiplier: Option<f64>,
    /// Absolute notional cap
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_abs_notional: Option<f64>,
    /// Beta proxy flag
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_beta_proxy: Option<bool>,
}

impl TryFrom<HedgeRuleRecord> for HedgeRule {
    type Error = ValidationError;

    fn try_from(record: HedgeRuleRecord) -> Result<Self, Self::Error> {
        let hedge_name = match record.hedge_name.trim() {
            "" => "HEDGE".to_string(),
            name => name.to_string(),
        };
        let target_factor_id = record.target_factor_id.trim().to_string();
        let hedge_factor_id = record.hedge_factor_id.trim().to_string();
        if target_factor_id.is_empty() || hedge_factor_id.is_empty() {
            return Err(ValidationError::EmptyFactorId(hedge_name));
        }
        let hedge_asset_class = match record.hedge_asset_class.trim() {
            "" => AssetClass::Index,
            code => code.parse()?,
        };
        let hedge_multiplier = record.hedge_multiplier.unwrap_or(1.0);
        if !hedge_multiplier.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                name: hedge_name,
                field: "hedge_multiplier",
            });
        }
        if record.max_abs_notional.is_some_and(|c| !c.is_finite()) {
            return Err(ValidationError::NonFiniteValue {
                name: hedge_name,
                field: "max_abs_notional",
            });
        }

        Ok(Self {
            hedge_name,
            target_factor_id,
            hedge_factor_id,
            hedge_asset_class,
            hedge_multiplier,
            max_abs_notional: record.max_abs_notional,
            use_beta_proxy: record.use_beta_proxy.unwrap_or(false),
            enabled: record.enabled.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_multiplier_zero() {
        let rule = HedgeRule::new("H", "A", "A", AssetClass::Index).with_multiplier(0.0);
        assert_eq!(rule.effective_multiplier(), 1.0);

        let rule = rule.with_multiplier(-2.0);
        assert_eq!(rule.effective_multiplier(), -2.0);
    }

    #[test]
    fn test_non_positive_cap_is_uncapped() {
        let rule = HedgeRule::new("H", "A", "A", AssetClass::Index);
        assert_eq!(rule.cap(), None);
        assert_eq!(rule.clone().with_max_abs_notional(0.0).cap(), None);
        assert_eq!(rule.clone().with_max_abs_notional(-5.0).cap(), None);
        assert_eq!(rule.with_max_abs_notional(5.0).cap(), Some(5.0));
    }

    #[test]
    fn test_record_defaults() {
        let rule = HedgeRule::try_from(HedgeRuleRecord {
            target_factor_id: ".SPX".to_string(),
            hedge_factor_id: ".SPX".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(rule.hedge_name, "HEDGE");
        assert_eq!(rule.hedge_asset_class, AssetClass::Index);
        assert_eq!(rule.hedge_multiplier, 1.0);
        assert!(rule.enabled);
        assert!(!rule.use_beta_proxy);
    }

    #[test]
    fn test_record_rejects_missing_factor() {
        let err = HedgeRule::try_from(HedgeRuleRecord {
            hedge_name: "TNX Hedge".to_string(),
            target_factor_id: ".TNX".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyFactorId("TNX Hedge".to_string()));
    }

    #[test]
    fn test_record_rejects_bad_class() {
        let err = HedgeRule::try_from(HedgeRuleRecord {
            target_factor_id: "A".to_string(),
            hedge_factor_id: "B".to_string(),
            hedge_asset_class: "SWAP".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::UnknownAssetClass("SWAP".to_string()));
    }
}
