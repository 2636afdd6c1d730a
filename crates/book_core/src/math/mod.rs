//! Numerical helpers shared by the risk layer.
//!
//! - [`stats`]: Empirical quantiles and population moments

pub mod stats;

pub use stats::{
    correlation, empirical_quantile, mean, population_covariance, population_variance,
    quantile_sorted,
};
