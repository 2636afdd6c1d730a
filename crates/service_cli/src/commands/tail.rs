//! Tail command implementation
//!
//! Ranks positions by their PnL on the portfolio's worst days.

use std::path::Path;

use book_risk::attribution::{tail_contributors, TailAttribution, TailConfig};
use book_risk::pnl::pnl_matrix;

use crate::commands::{load_inputs, FactorArgs};
use crate::output::{pct_opt, print_json, usd, OutputFormat, Table};
use crate::Result;

/// Run the tail command
pub fn run(book_path: &Path, factors: &FactorArgs, config: &TailConfig, format: OutputFormat) -> Result<()> {
    let (book, factors) = load_inputs(book_path, factors)?;
    let matrix = pnl_matrix(&book, &factors);
    let attribution = tail_contributors(&matrix, &matrix.portfolio(), config)?;

    match format {
        OutputFormat::Json => print_json(&attribution),
        OutputFormat::Table => {
            print_attribution(&attribution, config);
            Ok(())
        }
    }
}

fn print_attribution(attribution: &TailAttribution, config: &TailConfig) {
    let title = if attribution.used_worst_n {
        format!(
            "Tail contributors: worst {} days ({}% tail too thin)",
            attribution.tail_days.len(),
            config.tail_pct
        )
    } else {
        format!(
            "Tail contributors: {} days at or below the {}% quantile ({})",
            attribution.tail_days.len(),
            config.tail_pct,
            usd(attribution.threshold)
        )
    };
    let mut table = Table::new(["Position", "Avg tail PnL", "Sum tail PnL", "Loss share"]).with_title(title);
    for c in &attribution.contributors {
        table.push_row([
            c.name.clone(),
            usd(c.avg_pnl),
            usd(c.sum_pnl),
            pct_opt(Some(c.loss_share * 100.0), 1),
        ]);
    }
    table.print();

    let mut table = Table::new(["Date", "Portfolio PnL"]).with_title(format!("Worst {} days", config.worst_n));
    for (date, pnl) in &attribution.worst_days {
        table.push_row([date.to_string(), usd(*pnl)]);
    }
    table.print();
    println!("\nTotal tail loss: {}", usd(attribution.total_tail_loss));
}
