//! CSV loaders for books, factor tables and hedge rules.
//!
//! Rows are validated here, once. Invalid position and rule rows are
//! logged and skipped; malformed files are errors.

use std::path::Path;

use book_core::book::{RejectedRecord, TradingBook};
use book_core::market_data::{FactorSeries, FactorTransform, FillPolicy, QuoteMode};
use book_core::types::{HedgeRule, HedgeRuleRecord, PositionRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{CliError, Result};

/// Date format of the factor table's `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Spreadsheet-style flag: `true/false`, `1/0`, `yes/no`, `y/n`.
fn parse_flag(raw: Option<&str>) -> std::result::Result<Option<bool>, String> {
    match raw.map(|s| s.trim().to_lowercase()) {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => match s.as_str() {
            "true" | "1" | "yes" | "y" => Ok(Some(true)),
            "false" | "0" | "no" | "n" => Ok(Some(false)),
            _ => Err(format!("Invalid flag value: {}", s)),
        },
    }
}

#[derive(Debug, Deserialize)]
struct BookRow {
    #[serde(default)]
    enabled: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    asset_class: String,
    #[serde(default)]
    factor_id: String,
    #[serde(default)]
    notional_usd: Option<f64>,
    #[serde(default)]
    multiplier: Option<f64>,
    #[serde(default)]
    dv01_usd_per_bp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(default)]
    enabled: Option<String>,
    #[serde(default)]
    hedge_name: String,
    #[serde(default)]
    target_factor_id: String,
    #[serde(default)]
    hedge_factor_id: String,
    #[serde(default)]
    hedge_asset_class: String,
    #[serde(default)]
    hedge_multiplier: Option<f64>,
    #[serde(default)]
    max_abs_notional: Option<f64>,
    #[serde(default)]
    use_beta_proxy: Option<String>,
}

/// Loads a trading book.
///
/// Columns: `enabled,name,asset_class,factor_id,notional_usd,multiplier,dv01_usd_per_bp`.
/// Rows that fail validation are returned alongside the book.
pub fn load_book(path: &Path) -> Result<(TradingBook, Vec<RejectedRecord>)> {
    let mut reader = open(path)?;
    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<BookRow>().enumerate() {
        let row = row?;
        let enabled = parse_flag(row.enabled.as_deref())
            .map_err(|e| CliError::InvalidArgument(format!("{} row {}: {}", path.display(), i + 1, e)))?;
        records.push(PositionRecord {
            enabled,
            name: row.name,
            asset_class: row.asset_class,
            factor_id: row.factor_id,
            notional_usd: row.notional_usd,
            multiplier: row.multiplier,
            dv01_usd_per_bp: row.dv01_usd_per_bp,
        });
    }

    let (book, rejected) = TradingBook::from_records(records);
    for r in &rejected {
        warn!(row = r.row, error = %r.error, "Skipping invalid position row");
    }
    debug!(positions = book.len(), rejected = rejected.len(), "Loaded book");
    Ok((book, rejected))
}

/// Loads hedge rules, skipping invalid rows.
pub fn load_rules(path: &Path) -> Result<Vec<HedgeRule>> {
    let mut reader = open(path)?;
    let mut rules = Vec::new();
    for (i, row) in reader.deserialize::<RuleRow>().enumerate() {
        let row = row?;
        let flag_err =
            |e: String| CliError::InvalidArgument(format!("{} row {}: {}", path.display(), i + 1, e));
        let record = HedgeRuleRecord {
            enabled: parse_flag(row.enabled.as_deref()).map_err(flag_err)?,
            hedge_name: row.hedge_name,
            target_factor_id: row.target_factor_id,
            hedge_factor_id: row.hedge_factor_id,
            hedge_asset_class: row.hedge_asset_class,
            hedge_multiplier: row.hedge_multiplier,
            max_abs_notional: row.max_abs_notional,
            use_beta_proxy: parse_flag(row.use_beta_proxy.as_deref()).map_err(flag_err)?,
        };
        match HedgeRule::try_from(record) {
            Ok(rule) => rules.push(rule),
            Err(e) => warn!(row = i, error = %e, "Skipping invalid hedge rule row"),
        }
    }
    debug!(rules = rules.len(), "Loaded hedge rules");
    Ok(rules)
}

/// Loads a factor table: a `date` column and one column per factor.
///
/// Rows are sorted by date; empty cells are missing values. Duplicate
/// dates are an error.
pub fn load_factor_table(path: &Path) -> Result<FactorSeries> {
    let mut reader = open(path)?;
    let headers = reader.headers()?.clone();
    let date_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date"))
        .ok_or_else(|| {
            CliError::InvalidArgument(format!("{}: missing 'date' column", path.display()))
        })?;

    let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_col).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
            CliError::InvalidArgument(format!(
                "{} row {}: bad date '{}': {}",
                path.display(),
                i + 1,
                raw_date,
                e
            ))
        })?;
        let mut values = Vec::with_capacity(headers.len().saturating_sub(1));
        for (col, cell) in record.iter().enumerate() {
            if col == date_col {
                continue;
            }
            let value = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().map_err(|e| {
                    CliError::InvalidArgument(format!(
                        "{} row {} column '{}': {}",
                        path.display(),
                        i + 1,
                        headers.get(col).unwrap_or_default(),
                        e
                    ))
                })?)
            };
            values.push(value);
        }
        rows.push((date, values));
    }
    rows.sort_by_key(|(d, _)| *d);

    let ids: Vec<&str> = headers
        .iter()
        .enumerate()
        .filter(|(col, _)| *col != date_col)
        .map(|(_, h)| h)
        .collect();
    let mut factors = FactorSeries::new(rows.iter().map(|(d, _)| *d).collect())?;
    for (k, id) in ids.iter().enumerate() {
        let column = rows
            .iter()
            .map(|(_, values)| values.get(k).copied().flatten())
            .collect();
        factors.insert_column(*id, column)?;
    }
    debug!(rows = factors.len(), factors = factors.n_factors(), "Loaded factor table");
    Ok(factors)
}

/// Loads factor moves for `book`.
///
/// With `levels` set the file holds raw levels, converted per the asset
/// class of the positions referencing each column: log returns for
/// EQ/INDEX/FX, basis-point changes for RATES. Columns no position
/// references are dropped.
pub fn load_factors(
    path: &Path,
    book: &TradingBook,
    levels: bool,
    quote_mode: QuoteMode,
) -> Result<FactorSeries> {
    let table = load_factor_table(path)?;
    if !levels {
        return Ok(table);
    }
    let factors = FactorSeries::from_levels(&table, FillPolicy::ForwardFill, |id| {
        book.positions()
            .iter()
            .rev()
            .find(|p| p.factor_id == id)
            .map(|p| FactorTransform::for_asset_class(p.asset_class, quote_mode))
    })?;
    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use book_core::types::AssetClass;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    // ========================================
    // Book Tests
    // ========================================

    #[test]
    fn test_load_book() {
        let file = write_file(
            "enabled,name,asset_class,factor_id,notional_usd,multiplier,dv01_usd_per_bp\n\
             True,AAPL Delta,EQ,AAPL.O,1000000,0.55,0\n\
             1,Rates 10Y,rates,.TNX,,,120000\n\
             ,FX EURUSD,FX,EUR=,500000,,\n\
             no,Old,EQ,MSFT.O,1,1,0\n\
             true,Bad,BOND,X,1,1,0\n",
        );
        let (book, rejected) = load_book(file.path()).unwrap();
        assert_eq!(book.len(), 4);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].row, 4);

        let p = &book.positions()[0];
        assert_relative_eq!(p.exposure_usd(), 550_000.0);
        assert_eq!(book.positions()[1].asset_class, AssetClass::Rates);
        assert_eq!(book.positions()[2].multiplier, 1.0);
        assert!(book.positions()[2].enabled);
        assert!(!book.positions()[3].enabled);
        assert_eq!(book.enabled_positions().count(), 3);
    }

    #[test]
    fn test_load_book_missing_file() {
        let err = load_book(Path::new("/no/such/book.csv")).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_load_book_bad_flag() {
        let file = write_file("enabled,name,asset_class,factor_id\nmaybe,A,EQ,A\n");
        assert!(matches!(
            load_book(file.path()),
            Err(CliError::InvalidArgument(_))
        ));
    }

    // ========================================
    // Factor Tests
    // ========================================

    #[test]
    fn test_load_factor_table_sorts_and_keeps_gaps() {
        let file = write_file(
            "date,.SPX,.TNX\n\
             2024-01-03,0.01,2.5\n\
             2024-01-02,-0.02,\n",
        );
        let factors = load_factor_table(file.path()).unwrap();
        assert_eq!(factors.len(), 2);
        assert_eq!(
            factors.dates()[0],
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(factors.column(".SPX").unwrap(), &[Some(-0.02), Some(0.01)]);
        assert_eq!(factors.column(".TNX").unwrap(), &[None, Some(2.5)]);
    }

    #[test]
    fn test_load_factor_table_duplicate_date() {
        let file = write_file("date,A\n2024-01-02,1\n2024-01-02,2\n");
        assert!(matches!(
            load_factor_table(file.path()),
            Err(CliError::Series(_))
        ));
    }

    #[test]
    fn test_load_factor_table_requires_date() {
        let file = write_file("day,A\n2024-01-02,1\n");
        assert!(matches!(
            load_factor_table(file.path()),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_load_factors_from_levels() {
        let file = write_file(
            "date,.SPX,.TNX,UNUSED\n\
             2024-01-02,100,40.0,1\n\
             2024-01-03,110,41.5,1\n\
             2024-01-04,,42.0,1\n",
        );
        let book = TradingBook::new(vec![
            book_core::types::Position::delta("SPX", AssetClass::Index, ".SPX", 1.0, 1.0),
            book_core::types::Position::dv01("TNX", ".TNX", 1.0),
        ]);
        let factors = load_factors(file.path(), &book, true, QuoteMode::CboeX10).unwrap();
        assert_eq!(factors.n_factors(), 2);
        assert!(!factors.contains("UNUSED"));

        let spx = factors.column(".SPX").unwrap();
        assert_eq!(spx[0], None);
        assert_relative_eq!(spx[1].unwrap(), 1.1_f64.ln(), epsilon = 1e-12);
        // Forward-filled level: no move.
        assert_relative_eq!(spx[2].unwrap(), 0.0, epsilon = 1e-12);

        let tnx = factors.column(".TNX").unwrap();
        assert_relative_eq!(tnx[1].unwrap(), 15.0, epsilon = 1e-9);
        assert_relative_eq!(tnx[2].unwrap(), 5.0, epsilon = 1e-9);
    }

    // ========================================
    // Rule Tests
    // ========================================

    #[test]
    fn test_load_rules() {
        let file = write_file(
            "enabled,hedge_name,target_factor_id,hedge_factor_id,hedge_asset_class,hedge_multiplier,max_abs_notional,use_beta_proxy\n\
             TRUE,HEDGE_SPX,.SPX,.SPX,INDEX,1,5000000,TRUE\n\
             FALSE,,.TNX,.TNX,RATES,,,\n\
             TRUE,BAD,,.SPX,INDEX,1,,\n",
        );
        let rules = load_rules(file.path()).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].use_beta_proxy);
        assert_eq!(rules[0].cap(), Some(5_000_000.0));
        assert_eq!(rules[1].hedge_name, "HEDGE");
        assert_eq!(rules[1].hedge_asset_class, AssetClass::Rates);
        assert!(!rules[1].enabled);
    }

    #[test]
    fn test_sample_data_loads() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let (book, rejected) = load_book(&root.join("book.csv")).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(book.len(), 7);
        assert_eq!(book.enabled_positions().count(), 6);

        let factors =
            load_factors(&root.join("factor_levels.csv"), &book, true, QuoteMode::CboeX10).unwrap();
        assert_eq!(factors.len(), 420);
        assert_eq!(factors.n_factors(), 6);

        let rules = load_rules(&root.join("hedge_rules.csv")).unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules.iter().filter(|r| r.enabled).count(), 3);
    }
}
