//! Backtest command implementation
//!
//! Rolling out-of-sample VaR against realised portfolio PnL, with the
//! Kupiec and Christoffersen tests.

use std::path::Path;

use book_core::market_data::DatedSeries;
use book_risk::backtest::{
    run_backtest, BacktestConfig, BacktestReport, BacktestVerdict, ChristoffersenResult,
    ConditionalCoverageResult, KupiecResult,
};
use book_risk::parallel::ParallelConfig;
use book_risk::pnl::portfolio_pnl;
use serde::Serialize;
use tracing::info;

use crate::commands::{load_inputs, FactorArgs};
use crate::output::{num_opt, pct_opt, print_json, OutputFormat, Table};
use crate::Result;

/// Backtest run parameters after config and flag overrides.
#[derive(Debug, Clone)]
pub struct BacktestParams {
    /// Trailing window
    pub window: usize,
    /// VaR confidence level
    pub alpha: f64,
    /// Significance level for the verdict
    pub level: f64,
    /// Rayon settings
    pub parallel: ParallelConfig,
}

#[derive(Debug, Serialize)]
struct BacktestSummary {
    window: usize,
    alpha: f64,
    level: f64,
    observations: usize,
    breaches: usize,
    expected_breach_rate: f64,
    breach_rate: Option<f64>,
    kupiec: Option<KupiecResult>,
    christoffersen: Option<ChristoffersenResult>,
    conditional_coverage: Option<ConditionalCoverageResult>,
    verdict: BacktestVerdict,
    breach_dates: Vec<String>,
}

impl BacktestSummary {
    fn new(report: &BacktestReport, level: f64) -> Self {
        Self {
            window: report.rolling.window,
            alpha: report.rolling.alpha,
            level,
            observations: report.observations(),
            breaches: report.breaches.breach_count(),
            expected_breach_rate: report.expected_breach_rate(),
            breach_rate: report.breach_rate(),
            kupiec: report.kupiec.clone(),
            christoffersen: report.christoffersen.clone(),
            conditional_coverage: report.conditional_coverage.clone(),
            verdict: report.verdict(level),
            breach_dates: report
                .breaches
                .breach_dates()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Writes `date,pnl,var,es,breach` for every date of the PnL index.
///
/// `breach` is empty where no forecast exists.
pub fn write_rolling_csv(pnl: &DatedSeries, report: &BacktestReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "pnl", "var", "es", "breach"])?;
    let breach_dates = report.breaches.breach_dates();
    let tested: std::collections::HashSet<_> = report.breaches.dates.iter().collect();
    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

    for (date, var, es) in report.rolling.rows() {
        let breach = if tested.contains(&date) {
            breach_dates.binary_search(&date).is_ok().to_string()
        } else {
            String::new()
        };
        writer.write_record([date.to_string(), cell(pnl.get(date)), cell(var), cell(es), breach])?;
    }
    writer.flush()?;
    info!("Wrote rolling forecasts to {}", path.display());
    Ok(())
}

/// Run the backtest command
pub fn run(
    book_path: &Path,
    factors: &FactorArgs,
    params: &BacktestParams,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let (book, factors) = load_inputs(book_path, factors)?;
    let pnl = portfolio_pnl(&book, &factors).series;

    let config = BacktestConfig {
        window: params.window,
        alpha: params.alpha,
        parallel: params.parallel.clone(),
    };
    let report = run_backtest(&pnl, &config)?;
    if let Some(path) = out {
        write_rolling_csv(&pnl, &report, path)?;
    }

    let summary = BacktestSummary::new(&report, params.level);
    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Table => {
            let mut table = Table::new(["Backtest", "Value"]).with_title(format!(
                "Rolling historical VaR backtest (window {}, {:.1}%)",
                summary.window,
                summary.alpha * 100.0
            ));
            table.push_row(["Observations".to_string(), summary.observations.to_string()]);
            table.push_row(["Breaches".to_string(), summary.breaches.to_string()]);
            table.push_row([
                "Expected breach rate".to_string(),
                pct_opt(Some(summary.expected_breach_rate * 100.0), 2),
            ]);
            table.push_row([
                "Observed breach rate".to_string(),
                pct_opt(summary.breach_rate.map(|r| r * 100.0), 2),
            ]);
            table.print();

            let mut table = Table::new(["Test", "LR", "p-value", "Reject"]);
            let reject = |p: Option<f64>| match p {
                Some(p) if p < summary.level => "yes".to_string(),
                Some(_) => "no".to_string(),
                None => "n/a".to_string(),
            };
            let k = summary.kupiec.as_ref();
            table.push_row([
                "Kupiec (coverage)".to_string(),
                num_opt(k.map(|k| k.likelihood_ratio), 3),
                num_opt(k.map(|k| k.p_value), 4),
                reject(k.map(|k| k.p_value)),
            ]);
            let c = summary.christoffersen.as_ref();
            table.push_row([
                "Christoffersen (independence)".to_string(),
                num_opt(c.map(|c| c.likelihood_ratio), 3),
                num_opt(c.map(|c| c.p_value), 4),
                reject(c.map(|c| c.p_value)),
            ]);
            let cc = summary.conditional_coverage.as_ref();
            table.push_row([
                "Conditional coverage".to_string(),
                num_opt(cc.map(|c| c.likelihood_ratio), 3),
                num_opt(cc.map(|c| c.p_value), 4),
                reject(cc.map(|c| c.p_value)),
            ]);
            table.print();

            println!(
                "\nVerdict at {:.0}% significance: {}",
                summary.level * 100.0,
                summary.verdict
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn pnl(n: usize) -> DatedSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let dates = (0..n as i64).map(|i| start + Duration::days(i)).collect();
        let values = (0..n).map(|i| ((i * 7919) % 211) as f64 - 105.0).collect();
        DatedSeries::from_values(dates, values).unwrap()
    }

    #[test]
    fn test_write_rolling_csv() {
        let pnl = pnl(80);
        let report = run_backtest(&pnl, &BacktestConfig::new(30, 0.95)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rolling.csv");
        write_rolling_csv(&pnl, &report, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "date,pnl,var,es,breach");
        assert_eq!(lines.len(), 81);
        // No forecast before the window fills.
        assert!(lines[1].ends_with(",,,"));
        let flagged = lines[1..]
            .iter()
            .filter(|l| l.ends_with(",true"))
            .count();
        assert_eq!(flagged, report.breaches.breach_count());
    }

    #[test]
    fn test_summary_counts() {
        let report = run_backtest(&pnl(120), &BacktestConfig::new(30, 0.95)).unwrap();
        let summary = BacktestSummary::new(&report, 0.05);
        assert_eq!(summary.observations, 90);
        assert_eq!(summary.breach_dates.len(), summary.breaches);
        assert_eq!(summary.verdict, report.verdict(0.05));
    }
}
