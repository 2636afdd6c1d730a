//! CLI error types.

use book_core::market_data::FactorSeriesError;
use book_risk::RiskError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the `bookrisk` command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid command-line or file content
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration could not be loaded or failed validation
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Factor table could not be built
    #[error("Factor data error: {0}")]
    Series(#[from] FactorSeriesError),

    /// Risk computation rejected its inputs
    #[error("Risk error: {0}")]
    Risk(#[from] RiskError),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
