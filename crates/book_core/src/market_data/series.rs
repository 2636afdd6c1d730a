//! Date-indexed columns and factor tables.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::error::FactorSeriesError;

fn check_dates(dates: &[NaiveDate]) -> Result<(), FactorSeriesError> {
    for pair in dates.windows(2) {
        if pair[0] == pair[1] {
            return Err(FactorSeriesError::DuplicateDate(pair[0]));
        }
        if pair[0] > pair[1] {
            return Err(FactorSeriesError::UnsortedDates {
                later: pair[0],
                earlier: pair[1],
            });
        }
    }
    Ok(())
}

#[inline]
fn sanitise(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// A single date-indexed numeric column. `None` marks a missing value.
///
/// # Examples
///
/// ```
/// use book_core::market_data::DatedSeries;
/// use chrono::NaiveDate;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let s = DatedSeries::new(vec![d(1), d(2), d(3)], vec![Some(1.0), None, Some(f64::NAN)]).unwrap();
/// assert_eq!(s.len(), 3);
/// assert_eq!(s.observed_len(), 1);
/// assert_eq!(s.get(d(1)), Some(1.0));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatedSeries {
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl DatedSeries {
    /// Creates a series; dates must be strictly increasing.
    ///
    /// Non-finite values are stored as missing.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Result<Self, FactorSeriesError> {
        check_dates(&dates)?;
        if values.len() != dates.len() {
            return Err(FactorSeriesError::LengthMismatch {
                factor_id: String::new(),
                expected: dates.len(),
                got: values.len(),
            });
        }
        Ok(Self {
            dates,
            values: values.into_iter().map(sanitise).collect(),
        })
    }

    /// Creates a fully observed series.
    pub fn from_values(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, FactorSeriesError> {
        Self::new(dates, values.into_iter().map(Some).collect())
    }

    /// Creates an all-missing series over the given index.
    pub fn missing(dates: &[NaiveDate]) -> Self {
        Self {
            dates: dates.to_vec(),
            values: vec![None; dates.len()],
        }
    }

    /// New series on the same index with values produced per row.
    pub fn map_rows<F>(&self, f: F) -> DatedSeries
    where
        F: FnMut(usize) -> Option<f64>,
    {
        DatedSeries {
            dates: self.dates.clone(),
            values: (0..self.dates.len()).map(f).map(sanitise).collect(),
        }
    }

    /// Date index.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Values aligned with [`dates`](Self::dates).
    #[inline]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Index length, including missing rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns `true` when the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Value on a date, `None` when absent or missing.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .and_then(|i| self.values[i])
    }

    /// Iterates `(date, value)` pairs including missing rows.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Observed `(date, value)` pairs in date order.
    pub fn observed(&self) -> Vec<(NaiveDate, f64)> {
        self.iter().filter_map(|(d, v)| v.map(|x| (d, x))).collect()
    }

    /// Observed values in date order.
    pub fn observed_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| *v).collect()
    }

    /// Number of observed values.
    pub fn observed_len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Dates where both series are observed, with both values.
    ///
    /// Alignment is a strict intersection; nothing is imputed.
    pub fn zip_observed(&self, other: &DatedSeries) -> Vec<(NaiveDate, f64, f64)> {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.dates.len() && j < other.dates.len() {
            match self.dates[i].cmp(&other.dates[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    if let (Some(a), Some(b)) = (self.values[i], other.values[j]) {
                        out.push((self.dates[i], a, b));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }
}

/// Date-indexed table of factor moves keyed by factor id.
///
/// Return columns (EQ/FX/INDEX) are dimensionless; RATES columns are
/// basis-point changes. Columns share one strictly increasing index.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactorSeries {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl FactorSeries {
    /// Creates an empty table over a strictly increasing date index.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, FactorSeriesError> {
        check_dates(&dates)?;
        Ok(Self {
            dates,
            columns: BTreeMap::new(),
        })
    }

    /// Inserts or replaces a column. Non-finite values become missing.
    pub fn insert_column(
        &mut self,
        factor_id: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), FactorSeriesError> {
        let factor_id = factor_id.into();
        if values.len() != self.dates.len() {
            return Err(FactorSeriesError::LengthMismatch {
                factor_id,
                expected: self.dates.len(),
                got: values.len(),
            });
        }
        self.columns
            .insert(factor_id, values.into_iter().map(sanitise).collect());
        Ok(())
    }

    /// Builder form of [`insert_column`](Self::insert_column).
    pub fn with_column(
        mut self,
        factor_id: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, FactorSeriesError> {
        self.insert_column(factor_id, values)?;
        Ok(self)
    }

    /// Date index.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns `true` when there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of columns.
    #[inline]
    pub fn n_factors(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if a column exists for the factor.
    #[inline]
    pub fn contains(&self, factor_id: &str) -> bool {
        self.columns.contains_key(factor_id)
    }

    /// Factor ids in sorted order.
    pub fn factor_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    /// Raw column values.
    pub fn column(&self, factor_id: &str) -> Option<&[Option<f64>]> {
        self.columns.get(factor_id).map(Vec::as_slice)
    }

    /// Value of one factor on one row.
    #[inline]
    pub fn value(&self, row: usize, factor_id: &str) -> Option<f64> {
        self.columns
            .get(factor_id)
            .and_then(|c| c.get(row).copied().flatten())
    }

    /// Series on this table's index with values produced per row.
    pub fn map_rows<F>(&self, f: F) -> DatedSeries
    where
        F: FnMut(usize) -> Option<f64>,
    {
        DatedSeries {
            dates: self.dates.clone(),
            values: (0..self.dates.len()).map(f).map(sanitise).collect(),
        }
    }

    /// A column as a standalone [`DatedSeries`].
    pub fn series(&self, factor_id: &str) -> Option<DatedSeries> {
        self.columns.get(factor_id).map(|values| DatedSeries {
            dates: self.dates.clone(),
            values: values.clone(),
        })
    }

    /// Strict alignment over the requested factors.
    ///
    /// Keeps the requested columns that exist and only rows where every
    /// one of them is observed. Unknown ids are ignored.
    pub fn aligned<S: AsRef<str>>(&self, factor_ids: &[S]) -> FactorSeries {
        let selected: Vec<(&String, &Vec<Option<f64>>)> = self
            .columns
            .iter()
            .filter(|(id, _)| factor_ids.iter().any(|f| f.as_ref() == id.as_str()))
            .collect();

        let keep: Vec<usize> = (0..self.dates.len())
            .filter(|&row| selected.iter().all(|(_, col)| col[row].is_some()))
            .collect();

        FactorSeries {
            dates: keep.iter().map(|&row| self.dates[row]).collect(),
            columns: selected
                .into_iter()
                .map(|(id, col)| (id.clone(), keep.iter().map(|&row| col[row]).collect()))
                .collect(),
        }
    }
}
