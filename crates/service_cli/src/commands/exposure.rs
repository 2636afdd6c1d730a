//! Exposure command implementation
//!
//! Prints net USD exposure by factor and by asset class.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::commands::load_book;
use crate::output::{print_json, usd, OutputFormat, Table};
use crate::Result;

#[derive(Debug, Serialize)]
struct ExposureOutput {
    by_factor: BTreeMap<String, f64>,
    by_asset_class: BTreeMap<String, f64>,
}

/// Run the exposure command
pub fn run(book_path: &Path, format: OutputFormat) -> Result<()> {
    let book = load_book(book_path)?;

    let by_factor = book.net_exposure_by_factor();
    let by_asset_class: BTreeMap<String, f64> = book
        .net_exposure_by_asset_class()
        .into_iter()
        .map(|(class, exposure)| (class.code().to_string(), exposure))
        .collect();

    match format {
        OutputFormat::Json => print_json(&ExposureOutput {
            by_factor,
            by_asset_class,
        }),
        OutputFormat::Table => {
            let mut table = Table::new(["Factor", "Net exposure"])
                .with_title("Net exposure by factor (USD; RATES in USD/bp)");
            for (factor, exposure) in &by_factor {
                table.push_row([factor.clone(), usd(*exposure)]);
            }
            table.print();

            let mut table = Table::new(["Asset class", "Net exposure"]);
            for (class, exposure) in &by_asset_class {
                table.push_row([class.clone(), usd(*exposure)]);
            }
            table.print();
            Ok(())
        }
    }
}
