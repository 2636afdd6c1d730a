//! Risk configuration management.
//!
//! Handles loading of `bookrisk.toml` with environment variable override
//! support. Every section is optional; missing keys take desk defaults.

use book_risk::attribution::TailConfig;
use book_risk::backtest::{DEFAULT_ALPHA, DEFAULT_WINDOW};
use book_risk::limits::RiskLimits;
use book_risk::parallel::ParallelConfig;
use book_risk::scenarios::StressShocks;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "bookrisk.toml";

/// Smallest rolling window accepted.
pub const MIN_WINDOW: usize = 30;

/// Largest rolling window accepted.
pub const MAX_WINDOW: usize = 1500;

/// Backtest section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    /// Trailing window in observations
    #[serde(default = "default_window")]
    pub window: usize,

    /// VaR confidence level
    #[serde(default = "default_backtest_alpha")]
    pub alpha: f64,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            window: default_window(),
            alpha: default_backtest_alpha(),
        }
    }
}

/// Hedge section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HedgeSection {
    /// Cap applied to rules without their own
    pub max_abs_notional: Option<f64>,
}

/// Risk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Confidence levels reported by `var`
    #[serde(default = "default_alphas")]
    pub alphas: Vec<f64>,

    /// Rolling backtest settings
    #[serde(default)]
    pub backtest: BacktestSection,

    /// Hedge construction settings
    #[serde(default)]
    pub hedge: HedgeSection,

    /// Stress shocks
    #[serde(default)]
    pub stress: StressShocks,

    /// Desk limits
    #[serde(default)]
    pub limits: RiskLimits,

    /// Tail attribution settings
    #[serde(default)]
    pub tail: TailConfig,

    /// Log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Rayon settings
    #[serde(default)]
    pub parallel: ParallelConfig,
}

fn default_alphas() -> Vec<f64> {
    vec![0.95, 0.99]
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_backtest_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            alphas: default_alphas(),
            backtest: BacktestSection::default(),
            hedge: HedgeSection::default(),
            stress: StressShocks::default(),
            limits: RiskLimits::default(),
            tail: TailConfig::default(),
            log_level: default_log_level(),
            parallel: ParallelConfig::default(),
        }
    }
}

fn in_unit_interval(x: f64) -> bool {
    x > 0.0 && x < 1.0
}

impl RiskConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from `path`, or defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides
    ///
    /// Unparseable values are ignored.
    pub fn with_env_override(mut self) -> Self {
        if let Some(alpha) = env_parse::<f64>("BOOKRISK_ALPHA") {
            self.alphas = vec![alpha];
            self.backtest.alpha = alpha;
        }

        if let Some(window) = env_parse::<usize>("BOOKRISK_WINDOW") {
            self.backtest.window = window;
        }

        if let Ok(log_level) = std::env::var("BOOKRISK_LOG_LEVEL") {
            self.log_level = log_level;
        }

        if let Some(cap) = env_parse::<f64>("BOOKRISK_MAX_HEDGE_NOTIONAL") {
            self.hedge.max_abs_notional = Some(cap);
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.alphas.is_empty() {
            errors.push("alphas cannot be empty".to_string());
        }
        for alpha in &self.alphas {
            if !in_unit_interval(*alpha) {
                errors.push(format!("Invalid alpha {}. Must be in (0, 1)", alpha));
            }
        }

        if !(MIN_WINDOW..=MAX_WINDOW).contains(&self.backtest.window) {
            errors.push(format!(
                "backtest.window {} outside allowed range {}..={}",
                self.backtest.window, MIN_WINDOW, MAX_WINDOW
            ));
        }
        if !in_unit_interval(self.backtest.alpha) {
            errors.push(format!(
                "Invalid backtest.alpha {}. Must be in (0, 1)",
                self.backtest.alpha
            ));
        }

        if let Some(cap) = self.hedge.max_abs_notional {
            if !(cap.is_finite() && cap > 0.0) {
                errors.push(format!(
                    "hedge.max_abs_notional {} must be positive and finite",
                    cap
                ));
            }
        }

        for (name, limit) in [
            ("var_limit", self.limits.var_limit),
            ("es_limit", self.limits.es_limit),
            ("stress_limit", self.limits.stress_limit),
        ] {
            if !(limit.is_finite() && limit > 0.0) {
                errors.push(format!("limits.{} {} must be positive", name, limit));
            }
        }

        if !(self.tail.tail_pct > 0.0 && self.tail.tail_pct < 100.0) {
            errors.push(format!(
                "tail.tail_pct {} must be in (0, 100)",
                self.tail.tail_pct
            ));
        }
        if self.tail.worst_n == 0 {
            errors.push("tail.worst_n must be greater than 0".to_string());
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        if self.parallel.batch_size == 0 {
            errors.push("parallel.batch_size must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from file (or defaults) with environment overrides and validate
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_or_default(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Configuration error type
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error reading config file
    Io(String),
    /// Parse error in config file
    Parse(String),
    /// Validation error
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::Validation(errors) => write!(f, "Validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn validation_errors(config: &RiskConfig) -> Vec<String> {
        match config.validate() {
            Err(ConfigError::Validation(errors)) => errors,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config() {
        let config = RiskConfig::default();
        assert_eq!(config.alphas, vec![0.95, 0.99]);
        assert_eq!(config.backtest.window, 250);
        assert_eq!(config.backtest.alpha, 0.99);
        assert_eq!(config.hedge.max_abs_notional, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RiskConfig = toml::from_str(
            r#"
            alphas = [0.975]

            [backtest]
            window = 500

            [stress]
            rates_bps = -50.0

            [limits]
            var_limit = 1000000.0
            "#,
        )
        .unwrap();
        assert_eq!(config.alphas, vec![0.975]);
        assert_eq!(config.backtest.window, 500);
        assert_eq!(config.backtest.alpha, 0.99);
        assert_eq!(config.stress.rates_bps, -50.0);
        assert_eq!(config.stress.equity_pct, -10.0);
        assert_eq!(config.limits.var_limit, 1_000_000.0);
        assert_eq!(config.limits.es_limit, 2_500_000.0);
        assert_eq!(config.tail.worst_n, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"\n[hedge]\nmax_abs_notional = 2500000.0").unwrap();
        let config = RiskConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.hedge.max_abs_notional, Some(2_500_000.0));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RiskConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, RiskConfig::default());
    }

    #[test]
    fn test_load_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alphas = \"not a list\"").unwrap();
        assert!(matches!(
            RiskConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("BOOKRISK_WINDOW", "500");
        std::env::set_var("BOOKRISK_ALPHA", "0.975");
        std::env::set_var("BOOKRISK_MAX_HEDGE_NOTIONAL", "not-a-number");
        let config = RiskConfig::default().with_env_override();
        assert_eq!(config.backtest.window, 500);
        assert_eq!(config.backtest.alpha, 0.975);
        assert_eq!(config.alphas, vec![0.975]);
        assert_eq!(config.hedge.max_abs_notional, None);
        std::env::remove_var("BOOKRISK_WINDOW");
        std::env::remove_var("BOOKRISK_ALPHA");
        std::env::remove_var("BOOKRISK_MAX_HEDGE_NOTIONAL");
    }

    #[test]
    fn test_validate_window_range() {
        let mut config = RiskConfig::default();
        config.backtest.window = 20;
        assert!(validation_errors(&config)
            .iter()
            .any(|e| e.contains("backtest.window")));

        config.backtest.window = 1500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_alphas() {
        let mut config = RiskConfig::default();
        config.alphas = vec![0.99, 1.0];
        assert!(validation_errors(&config)
            .iter()
            .any(|e| e.contains("Invalid alpha 1")));

        config.alphas.clear();
        assert!(validation_errors(&config)
            .iter()
            .any(|e| e.contains("alphas cannot be empty")));
    }

    #[test]
    fn test_validate_hedge_cap() {
        let mut config = RiskConfig::default();
        config.hedge.max_abs_notional = Some(-1.0);
        assert!(validation_errors(&config)
            .iter()
            .any(|e| e.contains("max_abs_notional")));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let mut config = RiskConfig::default();
        config.log_level = "loud".to_string();
        config.backtest.alpha = 0.0;
        config.tail.tail_pct = 0.0;
        config.limits.var_limit = 0.0;
        assert!(validation_errors(&config).len() >= 4);
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Validation(vec!["Error 1".to_string(), "Error 2".to_string()]);
        let display = format!("{}", error);
        assert!(display.contains("Error 1"));
        assert!(display.contains("Error 2"));
    }
}
