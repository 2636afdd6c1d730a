//! Level-to-factor transforms.
//!
//! Factor tables hold moves, not levels. Prices become returns and
//! yields become basis-point changes here, before any PnL is computed.
//! Forward-fill is the only fill policy and applies to raw levels.
//!
//! # Examples
//!
//! ```
//! use book_core::market_data::{bps_changes, forward_fill, QuoteMode};
//!
//! let levels = vec![Some(42.0), None, Some(42.5)];
//! let filled = forward_fill(&levels);
//! assert_eq!(filled, vec![Some(42.0), Some(42.0), Some(42.5)]);
//!
//! // CBOE 10Y yield index quotes yield x 10, so 0.5 index points = 5 bp
//! let bps = bps_changes(&filled, QuoteMode::CboeX10);
//! assert_eq!(bps[2], Some(5.0));
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::FactorSeriesError;
use super::series::FactorSeries;
use crate::types::AssetClass;

/// Quote convention of a yield level series.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuoteMode {
    /// CBOE yield indices (.TNX, .TYX) quote yield x 10
    #[default]
    CboeX10,
    /// Yield in percent (4.25 = 4.25%)
    Percent,
    /// Yield as a decimal (0.0425 = 4.25%)
    Decimal,
}

impl QuoteMode {
    /// Basis points per unit change in the quoted level.
    #[inline]
    pub fn bps_per_unit(&self) -> f64 {
        match self {
            QuoteMode::CboeX10 => 10.0,
            QuoteMode::Percent => 100.0,
            QuoteMode::Decimal => 10_000.0,
        }
    }
}

impl FromStr for QuoteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cboe_x10" | "cboe" => Ok(QuoteMode::CboeX10),
            "percent" | "pct" => Ok(QuoteMode::Percent),
            "decimal" => Ok(QuoteMode::Decimal),
            other => Err(format!("Unknown quote mode: {}", other)),
        }
    }
}

impl fmt::Display for QuoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteMode::CboeX10 => write!(f, "cboe_x10"),
            QuoteMode::Percent => write!(f, "percent"),
            QuoteMode::Decimal => write!(f, "decimal"),
        }
    }
}

/// How missing raw levels are treated before differencing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FillPolicy {
    /// Leave gaps; the adjacent moves are missing
    None,
    /// Carry the last observed level forward
    #[default]
    ForwardFill,
}

/// Transform from a level column to a factor column.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FactorTransform {
    /// `ln(x_t / x_{t-1})`
    LogReturn,
    /// `x_t / x_{t-1} - 1`
    SimpleReturn,
    /// `(x_t - x_{t-1})` scaled to basis points
    BpsChange(QuoteMode),
}

impl FactorTransform {
    /// Default transform for an asset class: log-returns, or bp changes for RATES.
    pub fn for_asset_class(asset_class: AssetClass, quote_mode: QuoteMode) -> Self {
        if asset_class.is_rates() {
            FactorTransform::BpsChange(quote_mode)
        } else {
            FactorTransform::LogReturn
        }
    }

    /// Applies the transform to a level column.
    pub fn apply(&self, levels: &[Option<f64>]) -> Vec<Option<f64>> {
        match self {
            FactorTransform::LogReturn => log_returns(levels),
            FactorTransform::SimpleReturn => simple_returns(levels),
            FactorTransform::BpsChange(mode) => bps_changes(levels, *mode),
        }
    }
}

/// Carries the last observed level forward. Leading gaps stay missing.
pub fn forward_fill(levels: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    levels
        .iter()
        .map(|v| {
            if let Some(x) = v.filter(|x| x.is_finite()) {
                last = Some(x);
            }
            last
        })
        .collect()
}

fn differences<F>(levels: &[Option<f64>], f: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> Option<f64>,
{
    let mut out = Vec::with_capacity(levels.len());
    if !levels.is_empty() {
        out.push(None);
    }
    for pair in levels.windows(2) {
        let mv = match (pair[0], pair[1]) {
            (Some(prev), Some(cur)) => f(prev, cur).filter(|x| x.is_finite()),
            _ => None,
        };
        out.push(mv);
    }
    out
}

/// Log-returns of a price column; non-positive prices give missing values.
pub fn log_returns(levels: &[Option<f64>]) -> Vec<Option<f64>> {
    differences(levels, |prev, cur| {
        (prev > 0.0 && cur > 0.0).then(|| (cur / prev).ln())
    })
}

/// Simple returns of a price column; non-positive prices give missing values.
pub fn simple_returns(levels: &[Option<f64>]) -> Vec<Option<f64>> {
    differences(levels, |prev, cur| {
        (prev > 0.0 && cur > 0.0).then(|| cur / prev - 1.0)
    })
}

/// Basis-point changes of a yield column.
pub fn bps_changes(levels: &[Option<f64>], mode: QuoteMode) -> Vec<Option<f64>> {
    let scale = mode.bps_per_unit();
    differences(levels, |prev, cur| Some((cur - prev) * scale))
}

impl FactorSeries {
    /// Builds a factor table from a table of raw levels.
    ///
    /// `transform_for` picks the transform per column; columns mapped to
    /// `None` are left out. The first row of every output column is
    /// missing since it has no prior level.
    pub fn from_levels<F>(
        levels: &FactorSeries,
        fill: FillPolicy,
        transform_for: F,
    ) -> Result<FactorSeries, FactorSeriesError>
    where
        F: Fn(&str) -> Option<FactorTransform>,
    {
        let mut out = FactorSeries::new(levels.dates().to_vec())?;
        for id in levels.factor_ids() {
            let (Some(transform), Some(column)) = (transform_for(id), levels.column(id)) else {
                continue;
            };
            let prepared = match fill {
                FillPolicy::ForwardFill => forward_fill(column),
                FillPolicy::None => column.to_vec(),
            };
            out.insert_column(id, transform.apply(&prepared))?;
        }
        Ok(out)
    }
}
