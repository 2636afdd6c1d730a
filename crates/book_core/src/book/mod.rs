//! Immutable trading-book snapshots.
//!
//! A [`TradingBook`] is an ordered list of validated positions. It is
//! built from externally supplied records, never mutated during a risk
//! computation, and re-derived whenever the source changes.
//!
//! ```text
//! PositionRecord rows ──► TradingBook::from_records ──► (TradingBook, rejected rows)
//!                                  │
//!                                  ▼
//!                    net_exposure_by_factor / by_asset_class
//! ```

use std::collections::BTreeMap;

use crate::types::{AssetClass, Position, PositionRecord, ValidationError};

/// A raw record rejected at the boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedRecord {
    /// Zero-based row index in the supplied record list
    pub row: usize,
    /// Why the row was rejected
    pub error: ValidationError,
}

/// Ordered, immutable collection of positions.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradingBook {
    positions: Vec<Position>,
}

impl TradingBook {
    /// Creates a book from validated positions.
    pub fn new(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Validates raw records, keeping the valid ones in input order.
    ///
    /// Invalid rows are returned alongside the book rather than failing
    /// the whole load.
    pub fn from_records<I>(records: I) -> (Self, Vec<RejectedRecord>)
    where
        I: IntoIterator<Item = PositionRecord>,
    {
        let mut positions = Vec::new();
        let mut rejected = Vec::new();
        for (row, record) in records.into_iter().enumerate() {
            match Position::try_from(record) {
                Ok(p) => positions.push(p),
                Err(error) => rejected.push(RejectedRecord { row, error }),
            }
        }
        (Self { positions }, rejected)
    }

    /// All positions, enabled or not.
    #[inline]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of positions, enabled or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the book holds no positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterator over enabled positions in book order.
    pub fn enabled_positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.positions.iter().filter(|p| p.enabled)
    }

    /// Net USD exposure per factor over enabled positions.
    pub fn net_exposure_by_factor(&self) -> BTreeMap<String, f64> {
        let mut net = BTreeMap::new();
        for p in self.enabled_positions() {
            *net.entry(p.factor_id.clone()).or_insert(0.0) += p.exposure_usd();
        }
        net
    }

    /// Net USD exposure to a single factor; zero when nothing references it.
    pub fn net_exposure(&self, factor_id: &str) -> f64 {
        self.enabled_positions()
            .filter(|p| p.factor_id == factor_id)
            .map(Position::exposure_usd)
            .sum()
    }

    /// Net exposure per asset class over enabled positions.
    ///
    /// Mixes units (USD per unit return and USD per bp), so it is a
    /// reporting breakdown only.
    pub fn net_exposure_by_asset_class(&self) -> BTreeMap<AssetClass, f64> {
        let mut net = BTreeMap::new();
        for p in self.enabled_positions() {
            *net.entry(p.asset_class).or_insert(0.0) += p.exposure_usd();
        }
        net
    }

    /// New snapshot of this book's enabled positions followed by `extra`.
    ///
    /// Used to recompute PnL with generated hedges included.
    pub fn with_positions<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let mut positions: Vec<Position> = self.enabled_positions().cloned().collect();
        positions.extend(extra);
        Self { positions }
    }
}

impl FromIterator<Position> for TradingBook {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
