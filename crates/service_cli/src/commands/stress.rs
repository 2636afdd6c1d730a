//! Stress command implementation

use std::path::Path;

use book_risk::scenarios::{run_stress, StressShocks};

use crate::commands::load_book;
use crate::output::{print_json, usd, OutputFormat, Table};
use crate::Result;

/// Run the stress command
pub fn run(book_path: &Path, shocks: &StressShocks, format: OutputFormat) -> Result<()> {
    let book = load_book(book_path)?;
    let result = run_stress(&book, shocks);

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let mut table = Table::new(["Factor", "Exposure", "Shock", "Stress PnL (USD)"]).with_title(format!(
                "Stress: equity {:+}%, FX {:+}%, rates {:+}bp",
                shocks.equity_pct, shocks.fx_pct, shocks.rates_bps
            ));
            for row in &result.rows {
                table.push_row([
                    row.factor_id.clone(),
                    usd(row.exposure),
                    format!("{:+.4}", row.shock),
                    usd(row.pnl),
                ]);
            }
            table.push_row(["Total".to_string(), String::new(), String::new(), usd(result.total_pnl)]);
            table.print();
            println!("\nStress loss: {}", usd(result.stress_loss()));
            Ok(())
        }
    }
}
