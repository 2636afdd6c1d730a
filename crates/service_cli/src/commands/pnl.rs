//! PnL command implementation
//!
//! Maps the book onto the factor table and summarises position and
//! portfolio PnL. The full matrix can be written to CSV.

use std::path::Path;

use book_risk::pnl::{pnl_matrix, PnlMatrix};
use serde::Serialize;
use tracing::info;

use crate::commands::{load_inputs, FactorArgs};
use crate::output::{print_json, usd, OutputFormat, Table};
use crate::Result;

#[derive(Debug, Serialize)]
struct PnlSummary {
    observed_days: usize,
    total_pnl: f64,
    mean_pnl: Option<f64>,
    worst_day: Option<(String, f64)>,
    best_day: Option<(String, f64)>,
    positions: Vec<(String, f64)>,
    dropped: Vec<String>,
}

fn summarise(matrix: &PnlMatrix) -> PnlSummary {
    let observed = matrix.portfolio().observed();
    let total_pnl: f64 = observed.iter().map(|(_, v)| v).sum();
    let mean_pnl = (!observed.is_empty()).then(|| total_pnl / observed.len() as f64);
    let worst_day = observed
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(d, v)| (d.to_string(), *v));
    let best_day = observed
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(d, v)| (d.to_string(), *v));

    PnlSummary {
        observed_days: observed.len(),
        total_pnl,
        mean_pnl,
        worst_day,
        best_day,
        positions: matrix.column_totals(),
        dropped: matrix.dropped().to_vec(),
    }
}

/// Writes `date,<position>...,portfolio`; missing cells are empty.
pub fn write_matrix_csv(matrix: &PnlMatrix, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["date".to_string()];
    header.extend(matrix.columns().iter().map(|c| c.name.clone()));
    header.push("portfolio".to_string());
    writer.write_record(&header)?;

    let portfolio = matrix.portfolio();
    for (row, (date, total)) in portfolio.iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(
            matrix
                .row(row)
                .into_iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        record.push(total.map(|x| x.to_string()).unwrap_or_default());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("Wrote PnL matrix to {}", path.display());
    Ok(())
}

/// Run the pnl command
pub fn run(book_path: &Path, factors: &FactorArgs, out: Option<&Path>, format: OutputFormat) -> Result<()> {
    let (book, factors) = load_inputs(book_path, factors)?;
    let matrix = pnl_matrix(&book, &factors);
    if let Some(path) = out {
        write_matrix_csv(&matrix, path)?;
    }

    let summary = summarise(&matrix);
    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Table => {
            let mut table = Table::new(["Position", "Total PnL (USD)"]).with_title("PnL by position");
            for (name, total) in &summary.positions {
                table.push_row([name.clone(), usd(*total)]);
            }
            table.print();

            let mut table = Table::new(["Portfolio", "Value"]);
            table.push_row(["Observed days".to_string(), summary.observed_days.to_string()]);
            table.push_row(["Total PnL".to_string(), usd(summary.total_pnl)]);
            if let Some(mean) = summary.mean_pnl {
                table.push_row(["Mean daily PnL".to_string(), usd(mean)]);
            }
            if let Some((date, pnl)) = &summary.worst_day {
                table.push_row([format!("Worst day ({})", date), usd(*pnl)]);
            }
            if let Some((date, pnl)) = &summary.best_day {
                table.push_row([format!("Best day ({})", date), usd(*pnl)]);
            }
            table.print();

            if !summary.dropped.is_empty() {
                println!("\nDropped (factor not in table): {}", summary.dropped.join(", "));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use book_core::book::TradingBook;
    use book_core::market_data::FactorSeries;
    use book_core::types::{AssetClass, Position};
    use chrono::NaiveDate;

    fn matrix() -> PnlMatrix {
        let dates = (2..5)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let factors = FactorSeries::new(dates)
            .unwrap()
            .with_column("A", vec![Some(0.01), None, Some(-0.02)])
            .unwrap();
        let book = TradingBook::new(vec![
            Position::delta("A", AssetClass::Eq, "A", 1_000_000.0, 1.0),
            Position::delta("B", AssetClass::Eq, "MISSING", 1_000_000.0, 1.0),
        ]);
        pnl_matrix(&book, &factors)
    }

    #[test]
    fn test_summarise() {
        let summary = summarise(&matrix());
        assert_eq!(summary.observed_days, 2);
        assert_relative_eq!(summary.total_pnl, -10_000.0, epsilon = 1e-6);
        assert_eq!(summary.worst_day.unwrap().0, "2024-01-04");
        assert_eq!(summary.dropped, vec!["B".to_string()]);
    }

    #[test]
    fn test_write_matrix_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pnl.csv");
        write_matrix_csv(&matrix(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "date,A,portfolio");
        assert_eq!(lines[2], "2024-01-03,,");
        assert_eq!(lines.len(), 4);
    }
}
