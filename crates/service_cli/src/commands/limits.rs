//! Limits command implementation
//!
//! Compares portfolio VaR, ES and stress loss with the desk limits.

use std::path::Path;

use book_risk::limits::{check_limits, LimitCheck, LimitStatus, RiskLimits};
use book_risk::metrics::RiskReport;
use book_risk::pnl::portfolio_pnl;
use book_risk::scenarios::{run_stress, StressShocks};
use tracing::warn;

use crate::commands::{load_inputs, FactorArgs};
use crate::output::{pct_opt, print_json, usd, usd_opt, OutputFormat, Table};
use crate::Result;

/// Run the limits command
pub fn run(
    book_path: &Path,
    factors: &FactorArgs,
    alpha: f64,
    shocks: &StressShocks,
    limits: &RiskLimits,
    format: OutputFormat,
) -> Result<()> {
    let (book, factors) = load_inputs(book_path, factors)?;
    let pnl = portfolio_pnl(&book, &factors);
    if !pnl.dropped.is_empty() {
        warn!("VaR/ES exclude positions without factor data: {}", pnl.dropped.join(", "));
    }

    let report = RiskReport::compute(&pnl.series.observed_values(), alpha)?;
    let stress = run_stress(&book, shocks);
    let checks = check_limits(alpha, report.var, report.es, stress.stress_loss(), limits);

    match format {
        OutputFormat::Json => print_json(&checks),
        OutputFormat::Table => {
            print_checks(&checks);
            Ok(())
        }
    }
}

fn print_checks(checks: &[LimitCheck]) {
    let mut table = Table::new(["Metric", "Value", "Limit", "Utilisation", "Headroom", "Status"])
        .with_title("Risk limits");
    for c in checks {
        table.push_row([
            c.metric.clone(),
            usd_opt(c.value),
            usd(c.limit),
            pct_opt(c.utilisation().map(|u| u * 100.0), 1),
            usd_opt(c.headroom),
            c.status.to_string(),
        ]);
    }
    table.print();

    let breaches = checks.iter().filter(|c| c.status == LimitStatus::Breach).count();
    if breaches > 0 {
        println!("\n{} limit(s) breached", breaches);
    }
}
