//! Date-indexed factor data.
//!
//! This module provides the factor table consumed by the PnL engine and
//! the transforms that turn raw price/yield levels into factor moves.
//!
//! # Architecture
//!
//! ```text
//! raw levels ──► transforms (fill, returns, bp changes) ──► FactorSeries
//!                                                                │
//!                                  series(id) / aligned(ids) ◄───┘
//! ```
//!
//! Missing observations are `None`. Rows are only ever dropped when
//! combining columns; the forward-fill policy applies to raw levels,
//! never to derived changes.
//!
//! # Components
//!
//! - [`series`]: [`DatedSeries`] (single column) and [`FactorSeries`] (table)
//! - [`transforms`]: Level-to-factor transforms and quote conventions
//! - [`error`]: Construction errors ([`FactorSeriesError`])
//!
//! # Example
//!
//! ```
//! use book_core::market_data::FactorSeries;
//! use chrono::NaiveDate;
//!
//! let dates: Vec<NaiveDate> = (1..=3)
//!     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
//!     .collect();
//! let mut factors = FactorSeries::new(dates).unwrap();
//! factors.insert_column("A", vec![Some(0.01), None, Some(0.02)]).unwrap();
//! factors.insert_column("B", vec![Some(1.0), Some(2.0), Some(3.0)]).unwrap();
//!
//! let aligned = factors.aligned(&["A", "B"]);
//! assert_eq!(aligned.len(), 2);
//! ```

pub mod error;
pub mod series;
pub mod transforms;

pub use error::FactorSeriesError;
pub use series::{DatedSeries, FactorSeries};
pub use transforms::{
    bps_changes, forward_fill, log_returns, simple_returns, FactorTransform, FillPolicy, QuoteMode,
};
