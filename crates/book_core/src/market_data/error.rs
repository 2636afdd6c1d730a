//! Factor series error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building a factor table.
///
/// # Examples
///
/// ```
/// use book_core::market_data::FactorSeriesError;
///
/// let err = FactorSeriesError::LengthMismatch {
///     factor_id: ".SPX".to_string(),
///     expected: 10,
///     got: 9,
/// };
/// assert!(format!("{}", err).contains(".SPX"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorSeriesError {
    /// Dates are not in ascending order.
    #[error("Dates not sorted: {later} precedes {earlier}")]
    UnsortedDates {
        /// Date appearing first in the input
        later: NaiveDate,
        /// Date appearing after it
        earlier: NaiveDate,
    },

    /// The same date appears twice.
    #[error("Duplicate date: {0}")]
    DuplicateDate(NaiveDate),

    /// Column length differs from the date index length.
    #[error("Column '{factor_id}' has {got} values, index has {expected}")]
    LengthMismatch {
        /// Column being inserted
        factor_id: String,
        /// Index length
        expected: usize,
        /// Column length
        got: usize,
    },
}
