//! VaR command implementation
//!
//! Historical VaR and ES of the portfolio at each configured confidence
//! level, optionally with stand-alone VaR per position.

use std::path::Path;

use book_risk::metrics::{risk_report, standalone_var_by_position, RiskReport, StandaloneVar};
use book_risk::pnl::pnl_matrix;
use serde::Serialize;

use crate::commands::{load_inputs, FactorArgs};
use crate::output::{print_json, usd_opt, OutputFormat, Table};
use crate::Result;

#[derive(Debug, Serialize)]
struct VarOutput {
    reports: Vec<RiskReport>,
    dropped: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    standalone: Vec<StandaloneVar>,
}

/// Run the var command
pub fn run(
    book_path: &Path,
    factors: &FactorArgs,
    alphas: &[f64],
    by_position: bool,
    format: OutputFormat,
) -> Result<()> {
    let (book, factors) = load_inputs(book_path, factors)?;
    let matrix = pnl_matrix(&book, &factors);
    let sample = matrix.portfolio().observed_values();

    let reports = risk_report(&sample, alphas)?;
    let standalone = match (by_position, alphas.last()) {
        (true, Some(alpha)) => standalone_var_by_position(&matrix, *alpha)?,
        _ => Vec::new(),
    };
    let output = VarOutput {
        reports,
        dropped: matrix.dropped().to_vec(),
        standalone,
    };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            let mut table = Table::new(["Confidence", "VaR (USD)", "ES (USD)", "Observations"])
                .with_title("Historical VaR / ES (1-day, positive = loss)");
            for r in &output.reports {
                table.push_row([
                    format!("{:.1}%", r.alpha * 100.0),
                    usd_opt(r.var),
                    usd_opt(r.es),
                    r.sample_size.to_string(),
                ]);
            }
            table.print();

            if let (false, Some(alpha)) = (output.standalone.is_empty(), alphas.last()) {
                let mut table = Table::new(["Position", "Stand-alone VaR (USD)", "Observations"])
                    .with_title(format!("Stand-alone VaR @{:.1}% (not additive)", alpha * 100.0));
                for s in &output.standalone {
                    table.push_row([s.name.clone(), usd_opt(s.var), s.sample_size.to_string()]);
                }
                table.print();
            }

            if !output.dropped.is_empty() {
                println!("\nDropped (factor not in table): {}", output.dropped.join(", "));
            }
            if output.reports.iter().any(|r| r.var.is_none()) {
                println!("n/a: not enough observations for that confidence level");
            }
            Ok(())
        }
    }
}
