//! Desk-style factor exposures.
//!
//! A [`Position`] is a validated, single-factor exposure. Raw blotter rows
//! arrive as [`PositionRecord`] and are converted with `TryFrom`, which is
//! the only place malformed input is rejected.

use super::asset_class::AssetClass;
use super::error::ValidationError;

/// A single signed exposure to one risk factor.
///
/// # Examples
///
/// ```
/// use book_core::types::{AssetClass, Position};
///
/// let eq = Position::delta("AAPL Delta", AssetClass::Eq, "AAPL.O", 1_000_000.0, 0.5);
/// assert_eq!(eq.exposure_usd(), 500_000.0);
///
/// let rates = Position::dv01("Rates 10Y", ".TNX", 100_000.0);
/// assert_eq!(rates.exposure_usd(), 100_000.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Display label (uniqueness not enforced)
    pub name: String,
    /// Asset class selecting the exposure formula
    pub asset_class: AssetClass,
    /// Risk factor this position depends on
    pub factor_id: String,
    /// Signed USD notional (EQ/FX/INDEX)
    pub notional_usd: f64,
    /// Delta/beta/weight applied to the notional
    pub multiplier: f64,
    /// Signed USD per basis point (RATES)
    pub dv01_usd_per_bp: f64,
    /// Disabled positions are excluded from every aggregate
    pub enabled: bool,
}

impl Position {
    /// Creates an enabled notional-based position.
    pub fn delta(
        name: impl Into<String>,
        asset_class: AssetClass,
        factor_id: impl Into<String>,
        notional_usd: f64,
        multiplier: f64,
    ) -> Self {
        Self {
            name: name.into(),
            asset_class,
            factor_id: factor_id.into(),
            notional_usd,
            multiplier,
            dv01_usd_per_bp: 0.0,
            enabled: true,
        }
    }

    /// Creates an enabled RATES position from its DV01.
    pub fn dv01(name: impl Into<String>, factor_id: impl Into<String>, dv01_usd_per_bp: f64) -> Self {
        Self {
            name: name.into(),
            asset_class: AssetClass::Rates,
            factor_id: factor_id.into(),
            notional_usd: 0.0,
            multiplier: 1.0,
            dv01_usd_per_bp,
            enabled: true,
        }
    }

    /// Returns a copy with the enabled flag replaced.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// USD exposure per unit factor move.
    ///
    /// DV01 for RATES (per bp), `notional_usd * multiplier` otherwise.
    #[inline]
    pub fn exposure_usd(&self) -> f64 {
        if self.asset_class.is_rates() {
            self.dv01_usd_per_bp
        } else {
            self.notional_usd * self.multiplier
        }
    }
}

/// Raw blotter row as supplied by an external editor or file.
///
/// Numeric fields are optional; blanks take the blotter defaults during
/// conversion (notional and DV01 zero, multiplier one, enabled true).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionRecord {
    /// Enabled flag
    #[cfg_attr(feature = "serde", serde(default))]
    pub enabled: Option<bool>,
    /// Display label
    pub name: String,
    /// Asset class code
    pub asset_class: String,
    /// Risk factor identifier
    pub factor_id: String,
    /// Signed USD notional
    #[cfg_attr(feature = "serde", serde(default))]
    pub notional_usd: Option<f64>,
    /// Multiplier (blank or zero reads as 1.0)
    #[cfg_attr(feature = "serde", serde(default))]
    pub multiplier: Option<f64>,
    /// Signed DV01 in USD per bp
    #[cfg_attr(feature = "serde", serde(default))]
    pub dv01_usd_per_bp: Option<f64>,
}

fn finite(name: &str, field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFiniteValue {
            name: name.to_string(),
            field,
        })
    }
}

impl TryFrom<PositionRecord> for Position {
    type Error = ValidationError;

    fn try_from(record: PositionRecord) -> Result<Self, Self::Error> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let factor_id = record.factor_id.trim().to_string();
        if factor_id.is_empty() {
            return Err(ValidationError::EmptyFactorId(name));
        }
        let asset_class: AssetClass = record.asset_class.parse()?;

        let notional_usd = finite(&name, "notional_usd", record.notional_usd.unwrap_or(0.0))?;
        let dv01_usd_per_bp =
            finite(&name, "dv01_usd_per_bp", record.dv01_usd_per_bp.unwrap_or(0.0))?;
        let multiplier = match record.multiplier {
            Some(m) if m != 0.0 => finite(&name, "multiplier", m)?,
            _ => 1.0,
        };

        Ok(Self {
            name,
            asset_class,
            factor_id,
            notional_usd,
            multiplier,
            dv01_usd_per_bp,
            enabled: record.enabled.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str, class: &str, factor: &str) -> PositionRecord {
        PositionRecord {
            enabled: Some(true),
            name: name.to_string(),
            asset_class: class.to_string(),
            factor_id: factor.to_string(),
            notional_usd: Some(2_000_000.0),
            multiplier: Some(1.0),
            dv01_usd_per_bp: Some(0.0),
        }
    }

    // ========================================
    // Exposure Tests
    // ========================================

    #[test]
    fn test_exposure_notional_classes() {
        let p = Position::delta("A", AssetClass::Eq, "A", 1_000_000.0, 0.5);
        assert_eq!(p.exposure_usd(), 500_000.0);

        let fx = Position::delta("FX", AssetClass::Fx, "EUR=", -250_000.0, 1.0);
        assert_eq!(fx.exposure_usd(), -250_000.0);
    }

    #[test]
    fn test_exposure_rates_ignores_notional() {
        let mut p = Position::dv01("Rates", ".TNX", 100_000.0);
        p.notional_usd = 5_000_000.0;
        p.multiplier = 3.0;
        assert_eq!(p.exposure_usd(), 100_000.0);
    }

    #[test]
    fn test_exposure_non_rates_ignores_dv01() {
        let mut p = Position::delta("SPX", AssetClass::Index, ".SPX", 2_000_000.0, 1.0);
        p.dv01_usd_per_bp = 99.0;
        assert_eq!(p.exposure_usd(), 2_000_000.0);
    }

    // ========================================
    // Record Conversion Tests
    // ========================================

    #[test]
    fn test_record_conversion() {
        let p = Position::try_from(record(" SPX Beta ", "index", " .SPX ")).unwrap();
        assert_eq!(p.name, "SPX Beta");
        assert_eq!(p.factor_id, ".SPX");
        assert_eq!(p.asset_class, AssetClass::Index);
        assert!(p.enabled);
    }

    #[test]
    fn test_record_rejects_empty_name() {
        let err = Position::try_from(record("  ", "EQ", "A")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
    }

    #[test]
    fn test_record_rejects_empty_factor() {
        let err = Position::try_from(record("A", "EQ", "")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyFactorId("A".to_string()));
    }

    #[test]
    fn test_record_rejects_unknown_class() {
        let err = Position::try_from(record("A", "CMDTY", "CL1")).unwrap_err();
        assert_eq!(err, ValidationError::UnknownAssetClass("CMDTY".to_string()));
    }

    #[test]
    fn test_record_rejects_nan() {
        let mut r = record("A", "EQ", "A");
        r.notional_usd = Some(f64::NAN);
        assert!(matches!(
            Position::try_from(r),
            Err(ValidationError::NonFiniteValue { field: "notional_usd", .. })
        ));
    }

    #[test]
    fn test_record_defaults() {
        let r = PositionRecord {
            name: "Rates".to_string(),
            asset_class: "RATES".to_string(),
            factor_id: ".TYX".to_string(),
            multiplier: Some(0.0),
            ..Default::default()
        };
        let p = Position::try_from(r).unwrap();
        assert_eq!(p.multiplier, 1.0);
        assert_eq!(p.notional_usd, 0.0);
        assert_eq!(p.dv01_usd_per_bp, 0.0);
        assert!(p.enabled);
    }

    // ========================================
    // Property Tests
    // ========================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn prop_exposure_linear_in_notional(
            notional in -1e9f64..1e9,
            multiplier in -5.0f64..5.0,
            k in -100.0f64..100.0,
        ) {
            let base = Position::delta("P", AssetClass::Eq, "F", notional, multiplier);
            let scaled = Position::delta("P", AssetClass::Eq, "F", notional * k, multiplier);
            let tol = 1e-9 * (1.0 + (base.exposure_usd() * k).abs());
            prop_assert!((scaled.exposure_usd() - k * base.exposure_usd()).abs() <= tol);
        }

        #[test]
        fn prop_exposure_linear_in_multiplier(
            notional in -1e9f64..1e9,
            multiplier in -5.0f64..5.0,
            k in -100.0f64..100.0,
        ) {
            let base = Position::delta("P", AssetClass::Fx, "F", notional, multiplier);
            let scaled = Position::delta("P", AssetClass::Fx, "F", notional, multiplier * k);
            let tol = 1e-9 * (1.0 + (base.exposure_usd() * k).abs());
            prop_assert!((scaled.exposure_usd() - k * base.exposure_usd()).abs() <= tol);
        }

        #[test]
        fn prop_exposure_linear_in_dv01(dv01 in -1e7f64..1e7, k in -100.0f64..100.0) {
            let base = Position::dv01("R", "F", dv01);
            let scaled = Position::dv01("R", "F", dv01 * k);
            let tol = 1e-9 * (1.0 + (base.exposure_usd() * k).abs());
            prop_assert!((scaled.exposure_usd() - k * base.exposure_usd()).abs() <= tol);
        }
    }
}
