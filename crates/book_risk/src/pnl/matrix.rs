//! PnL matrix construction.

use book_core::book::TradingBook;
use book_core::market_data::{DatedSeries, FactorSeries};
use book_core::types::AssetClass;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// PnL of a single position over the factor index.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PnlColumn {
    /// Position name
    pub name: String,
    /// Factor driving the position
    pub factor_id: String,
    /// Asset class of the position
    pub asset_class: AssetClass,
    /// USD exposure used for the mapping
    pub exposure_usd: f64,
    /// Daily PnL; `None` where the factor is missing
    pub values: Vec<Option<f64>>,
}

impl PnlColumn {
    /// Sum of observed PnL over the whole index.
    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }
}

/// Date-indexed PnL per enabled position.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PnlMatrix {
    dates: Vec<NaiveDate>,
    columns: Vec<PnlColumn>,
    dropped: Vec<String>,
}

impl PnlMatrix {
    /// Date index, identical to the source factor table.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Columns in book order.
    #[inline]
    pub fn columns(&self) -> &[PnlColumn] {
        &self.columns
    }

    /// Enabled positions excluded because their factor is absent.
    #[inline]
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Number of position columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when no position contributed a column.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// First column with the given position name.
    pub fn column(&self, name: &str) -> Option<&PnlColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// A column as a [`DatedSeries`].
    pub fn column_series(&self, index: usize) -> Option<DatedSeries> {
        let column = self.columns.get(index)?;
        Some(self.series_from(|row| column.values[row]))
    }

    /// Values of every column on one row.
    pub fn row(&self, row: usize) -> Vec<Option<f64>> {
        self.columns
            .iter()
            .map(|c| c.values.get(row).copied().flatten())
            .collect()
    }

    /// Strict row-sum across columns.
    ///
    /// A row with any missing column is missing. With zero columns every
    /// row is missing.
    pub fn portfolio(&self) -> DatedSeries {
        if self.columns.is_empty() {
            return DatedSeries::missing(&self.dates);
        }
        self.series_from(|row| {
            self.columns
                .iter()
                .map(|c| c.values[row])
                .sum::<Option<f64>>()
        })
    }

    /// Cumulative PnL per position over the whole index.
    pub fn column_totals(&self) -> Vec<(String, f64)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.total()))
            .collect()
    }

    fn series_from<F>(&self, f: F) -> DatedSeries
    where
        F: FnMut(usize) -> Option<f64>,
    {
        DatedSeries::missing(&self.dates).map_rows(f)
    }
}

/// Portfolio PnL together with the positions left out of it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioPnl {
    /// Row-sum of the PnL matrix, indexed like the factor table
    pub series: DatedSeries,
    /// Enabled positions with no factor column
    pub dropped: Vec<String>,
}

/// Builds the PnL matrix of a book.
///
/// Enabled positions whose factor is absent from `factors` are excluded
/// and reported through [`PnlMatrix::dropped`].
///
/// # Examples
///
/// ```
/// use book_core::book::TradingBook;
/// use book_core::market_data::FactorSeries;
/// use book_core::types::{AssetClass, Position};
/// use book_risk::pnl::pnl_matrix;
/// use chrono::NaiveDate;
///
/// let dates: Vec<NaiveDate> = (1..=3)
///     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
///     .collect();
/// let factors = FactorSeries::new(dates)
///     .unwrap()
///     .with_column("A", vec![Some(0.01), Some(-0.02), Some(0.005)])
///     .unwrap();
/// let book = TradingBook::new(vec![
///     Position::delta("A Delta", AssetClass::Eq, "A", 1_000_000.0, 0.5),
///     Position::delta("B Delta", AssetClass::Eq, "B", 1_000_000.0, 1.0),
/// ]);
///
/// let matrix = pnl_matrix(&book, &factors);
/// assert_eq!(matrix.n_columns(), 1);
/// assert_eq!(matrix.dropped(), &["B Delta".to_string()]);
/// ```
pub fn pnl_matrix(book: &TradingBook, factors: &FactorSeries) -> PnlMatrix {
    let mut columns = Vec::new();
    let mut dropped = Vec::new();

    for position in book.enabled_positions() {
        let Some(factor) = factors.column(&position.factor_id) else {
            warn!(
                position = %position.name,
                factor_id = %position.factor_id,
                "No factor series for position; excluded from PnL"
            );
            dropped.push(position.name.clone());
            continue;
        };
        let exposure = position.exposure_usd();
        columns.push(PnlColumn {
            name: position.name.clone(),
            factor_id: position.factor_id.clone(),
            asset_class: position.asset_class,
            exposure_usd: exposure,
            values: factor.iter().map(|v| v.map(|x| x * exposure)).collect(),
        });
    }

    debug!(
        columns = columns.len(),
        dropped = dropped.len(),
        rows = factors.len(),
        "Built PnL matrix"
    );

    PnlMatrix {
        dates: factors.dates().to_vec(),
        columns,
        dropped,
    }
}

/// Portfolio PnL series of a book.
pub fn portfolio_pnl(book: &TradingBook, factors: &FactorSeries) -> PortfolioPnl {
    let matrix = pnl_matrix(book, factors);
    PortfolioPnl {
        series: matrix.portfolio(),
        dropped: matrix.dropped,
    }
}
