//! CLI command implementations
//!
//! Each submodule implements one subcommand. Inputs are loaded here so
//! every command validates books and factor tables the same way.

use std::path::PathBuf;

use book_core::book::TradingBook;
use book_core::market_data::{FactorSeries, QuoteMode};
use clap::Args;
use tracing::info;

use crate::loader;
use crate::Result;

pub mod backtest;
pub mod exposure;
pub mod hedge;
pub mod limits;
pub mod pnl;
pub mod stress;
pub mod tail;
pub mod var;

/// Factor table arguments shared by the PnL-based commands.
#[derive(Args, Debug, Clone)]
pub struct FactorArgs {
    /// Factor CSV: `date` column plus one column per factor id
    #[arg(short, long)]
    pub factors: PathBuf,

    /// The factor file holds raw levels rather than daily moves
    #[arg(long)]
    pub levels: bool,

    /// Quote convention of rates levels (cboe_x10, percent, decimal)
    #[arg(long, default_value = "cboe_x10")]
    pub quote_mode: QuoteMode,
}

impl FactorArgs {
    /// Loads factor moves, converting levels for `book` when requested.
    pub fn load(&self, book: &TradingBook) -> Result<FactorSeries> {
        loader::load_factors(&self.factors, book, self.levels, self.quote_mode)
    }
}

/// Loads a book, logging its size.
pub fn load_book(path: &std::path::Path) -> Result<TradingBook> {
    let (book, rejected) = loader::load_book(path)?;
    info!(
        "Book {}: {} positions ({} enabled, {} rejected rows)",
        path.display(),
        book.len(),
        book.enabled_positions().count(),
        rejected.len()
    );
    Ok(book)
}

/// Loads a book and the factor moves that drive it.
pub fn load_inputs(book: &std::path::Path, factors: &FactorArgs) -> Result<(TradingBook, FactorSeries)> {
    let book = load_book(book)?;
    let factors = factors.load(&book)?;
    info!(
        "Factors {}: {} dates x {} factors",
        date_range(&factors),
        factors.len(),
        factors.n_factors()
    );
    Ok((book, factors))
}

fn date_range(factors: &FactorSeries) -> String {
    match (factors.dates().first(), factors.dates().last()) {
        (Some(first), Some(last)) => format!("{}..{}", first, last),
        _ => "(empty)".to_string(),
    }
}
