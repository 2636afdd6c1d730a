//! # book_core: Foundation Types for the Trading-Book Risk Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! book_core is the bottom layer of the workspace, providing:
//! - Position data model and asset classes (`types`)
//! - Boundary validation of raw position and hedge-rule records (`types::error`)
//! - Immutable book snapshots and net-exposure aggregation (`book`)
//! - Date-indexed factor tables and level-to-factor transforms (`market_data`)
//! - Empirical quantiles and population moments (`math`)
//!
//! ## Dependencies
//!
//! Layer 1 has no dependencies on other workspace crates:
//! - num-traits: Generic statistics over floating-point types
//! - chrono: Trading-day dates
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use book_core::book::TradingBook;
//! use book_core::types::{AssetClass, Position};
//!
//! let book = TradingBook::new(vec![
//!     Position::delta("AAPL Delta", AssetClass::Eq, "AAPL.O", 1_000_000.0, 0.55),
//!     Position::dv01("Rates 10Y", ".TNX", 120_000.0),
//! ]);
//!
//! let net = book.net_exposure_by_factor();
//! assert_eq!(net["AAPL.O"], 550_000.0);
//! assert_eq!(net[".TNX"], 120_000.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for positions, rules and factor tables

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod book;
pub mod market_data;
pub mod math;
pub mod types;
