//! bookrisk CLI - Risk analytics for a linear trading book
//!
//! This is the operational entry point for the bookrisk risk engine.
//!
//! # Commands
//!
//! - `bookrisk exposure --book <file>` - Net exposure by factor and asset class
//! - `bookrisk pnl --book <file> --factors <file>` - Position and portfolio PnL
//! - `bookrisk var --book <file> --factors <file>` - Historical VaR / ES
//! - `bookrisk backtest --book <file> --factors <file>` - Rolling VaR backtest
//! - `bookrisk hedge --book <file> --rules <file>` - Hedge construction
//! - `bookrisk stress --book <file>` - Deterministic stress shocks
//! - `bookrisk limits --book <file> --factors <file>` - Limit monitoring
//! - `bookrisk tail --book <file> --factors <file>` - Tail-loss attribution
//!
//! # Architecture
//!
//! As the **S**ervice layer this crate only loads inputs, merges
//! configuration with flags and renders results; every number comes from
//! `book_risk`.

use std::path::PathBuf;

use book_risk::scenarios::StressShocks;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod loader;
mod output;

pub use error::{CliError, Result};

use commands::backtest::BacktestParams;
use commands::FactorArgs;
use config::{RiskConfig, DEFAULT_CONFIG_FILE, MAX_WINDOW, MIN_WINDOW};
use output::OutputFormat;

/// bookrisk trading-book risk CLI
#[derive(Parser)]
#[command(name = "bookrisk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Net exposure by factor and asset class
    Exposure {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,
    },

    /// Position and portfolio PnL over the factor history
    Pnl {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,

        #[command(flatten)]
        factors: FactorArgs,

        /// Write the full PnL matrix to this CSV file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Historical VaR and ES of the portfolio
    Var {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,

        #[command(flatten)]
        factors: FactorArgs,

        /// Confidence level; repeat for several (overrides config)
        #[arg(short, long)]
        alpha: Vec<f64>,

        /// Also report stand-alone VaR per position
        #[arg(long)]
        by_position: bool,
    },

    /// Rolling out-of-sample VaR backtest
    Backtest {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,

        #[command(flatten)]
        factors: FactorArgs,

        /// Trailing window in observations (overrides config)
        #[arg(short, long)]
        window: Option<usize>,

        /// VaR confidence level (overrides config)
        #[arg(short, long)]
        alpha: Option<f64>,

        /// Significance level of the coverage tests
        #[arg(long, default_value_t = 0.05)]
        level: f64,

        /// Write rolling forecasts and breaches to this CSV file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Build hedges from a rule file
    Hedge {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,

        /// Hedge rule CSV
        #[arg(short, long)]
        rules: PathBuf,

        /// Factor CSV, enabling the beta proxy and effectiveness report
        #[arg(short, long)]
        factors: Option<PathBuf>,

        /// The factor file holds raw levels
        #[arg(long)]
        levels: bool,

        /// Quote convention of rates levels
        #[arg(long, default_value = "cboe_x10")]
        quote_mode: book_core::market_data::QuoteMode,

        /// Confidence level of the effectiveness report
        #[arg(short, long, default_value_t = 0.99)]
        alpha: f64,
    },

    /// Deterministic stress shocks
    Stress {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,

        #[command(flatten)]
        shocks: ShockArgs,
    },

    /// VaR, ES and stress loss against desk limits
    Limits {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,

        #[command(flatten)]
        factors: FactorArgs,

        #[command(flatten)]
        shocks: ShockArgs,

        /// Confidence level (overrides config)
        #[arg(short, long)]
        alpha: Option<f64>,
    },

    /// Position contributions on the worst portfolio days
    Tail {
        /// Book CSV
        #[arg(short, long)]
        book: PathBuf,

        #[command(flatten)]
        factors: FactorArgs,

        /// Tail percentile in percent (overrides config)
        #[arg(long)]
        tail_pct: Option<f64>,

        /// Worst days used for a thin tail (overrides config)
        #[arg(long)]
        worst_n: Option<usize>,
    },
}

/// Stress shock overrides.
#[derive(clap::Args, Debug, Clone, Default)]
struct ShockArgs {
    /// Equity and index shock in percent
    #[arg(long, allow_hyphen_values = true)]
    equity_pct: Option<f64>,

    /// FX shock in percent
    #[arg(long, allow_hyphen_values = true)]
    fx_pct: Option<f64>,

    /// Rates shock in basis points
    #[arg(long, allow_hyphen_values = true)]
    rates_bps: Option<f64>,
}

impl ShockArgs {
    fn apply(&self, base: &StressShocks) -> StressShocks {
        StressShocks {
            equity_pct: self.equity_pct.unwrap_or(base.equity_pct),
            fx_pct: self.fx_pct.unwrap_or(base.fx_pct),
            rates_bps: self.rates_bps.unwrap_or(base.rates_bps),
        }
    }
}

fn check_alpha(alpha: f64) -> Result<f64> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(CliError::InvalidArgument(format!(
            "Confidence level {} must be in (0, 1)",
            alpha
        )))
    }
}

fn check_window(window: usize) -> Result<usize> {
    if (MIN_WINDOW..=MAX_WINDOW).contains(&window) {
        Ok(window)
    } else {
        Err(CliError::InvalidArgument(format!(
            "Window {} outside allowed range {}..={}",
            window, MIN_WINDOW, MAX_WINDOW
        )))
    }
}

fn init_tracing(verbose: bool, log_level: &str) {
    let default_level = if verbose { "debug" } else { log_level };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RiskConfig::load_with_env_and_validate(&cli.config)?;
    init_tracing(cli.verbose, &config.log_level);
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?config, "Loaded configuration from {}", cli.config.display());

    run(cli.command, &config, cli.format)
}

fn run(command: Commands, config: &RiskConfig, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Exposure { book } => commands::exposure::run(&book, format),
        Commands::Pnl { book, factors, out } => {
            commands::pnl::run(&book, &factors, out.as_deref(), format)
        }
        Commands::Var {
            book,
            factors,
            alpha,
            by_position,
        } => {
            let alphas = if alpha.is_empty() {
                config.alphas.clone()
            } else {
                alpha.into_iter().map(check_alpha).collect::<Result<Vec<_>>>()?
            };
            commands::var::run(&book, &factors, &alphas, by_position, format)
        }
        Commands::Backtest {
            book,
            factors,
            window,
            alpha,
            level,
            out,
        } => {
            let params = BacktestParams {
                window: check_window(window.unwrap_or(config.backtest.window))?,
                alpha: check_alpha(alpha.unwrap_or(config.backtest.alpha))?,
                level: check_alpha(level)?,
                parallel: config.parallel.clone(),
            };
            commands::backtest::run(&book, &factors, &params, out.as_deref(), format)
        }
        Commands::Hedge {
            book,
            rules,
            factors,
            levels,
            quote_mode,
            alpha,
        } => {
            let factors = factors.map(|factors| FactorArgs {
                factors,
                levels,
                quote_mode,
            });
            commands::hedge::run(
                &book,
                &rules,
                factors.as_ref(),
                config.hedge.max_abs_notional,
                check_alpha(alpha)?,
                &config.parallel,
                format,
            )
        }
        Commands::Stress { book, shocks } => {
            commands::stress::run(&book, &shocks.apply(&config.stress), format)
        }
        Commands::Limits {
            book,
            factors,
            shocks,
            alpha,
        } => commands::limits::run(
            &book,
            &factors,
            check_alpha(alpha.unwrap_or(config.backtest.alpha))?,
            &shocks.apply(&config.stress),
            &config.limits,
            format,
        ),
        Commands::Tail {
            book,
            factors,
            tail_pct,
            worst_n,
        } => {
            let tail = book_risk::attribution::TailConfig {
                tail_pct: tail_pct.unwrap_or(config.tail.tail_pct),
                worst_n: worst_n.unwrap_or(config.tail.worst_n),
                ..config.tail.clone()
            };
            commands::tail::run(&book, &factors, &tail, format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_var_with_alphas() {
        let cli = Cli::try_parse_from([
            "bookrisk", "var", "--book", "b.csv", "--factors", "f.csv", "-a", "0.95", "-a", "0.99",
            "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Var { alpha, factors, .. } => {
                assert_eq!(alpha, vec![0.95, 0.99]);
                assert_eq!(factors.factors, Path::new("f.csv"));
                assert!(!factors.levels);
            }
            _ => panic!("Expected var command"),
        }
    }

    #[test]
    fn test_shock_overrides() {
        let cli = Cli::try_parse_from(["bookrisk", "stress", "--book", "b.csv", "--rates-bps", "-100"])
            .unwrap();
        let Commands::Stress { shocks, .. } = cli.command else {
            panic!("Expected stress command");
        };
        let applied = shocks.apply(&StressShocks::default());
        assert_eq!(applied.rates_bps, -100.0);
        assert_eq!(applied.equity_pct, -10.0);
        assert_eq!(applied.fx_pct, 5.0);
    }

    #[test]
    fn test_check_alpha() {
        assert_eq!(check_alpha(0.99).unwrap(), 0.99);
        assert!(matches!(check_alpha(1.0), Err(CliError::InvalidArgument(_))));
        assert!(check_alpha(0.0).is_err());
        assert_eq!(check_window(250).unwrap(), 250);
        assert!(check_window(10).is_err());
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["bookrisk", "exposure", "--book", "b.csv"]).unwrap();
        assert_eq!(cli.config, Path::new(DEFAULT_CONFIG_FILE));
        assert!(!cli.verbose);
    }
}
