//! Configuration loading and defaults

use crate::error::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    pub llm: Option<LlmConfig>,
}

impl Config {
    /// Load configuration from a TOML file with `SIGNALBOT_` env overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("SIGNALBOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Symbols swept on every tick
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Seconds between sweeps
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Minimum confidence for a threshold-mode signal
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Local hour after which the daily report may fire
    #[serde(default = "default_market_close_hour")]
    pub market_close_hour: u32,
    /// Fixed sleep after a failed tick (no escalating backoff)
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,
    /// Use the LLM arbitration gate instead of the confidence threshold.
    /// The two modes are mutually exclusive per orchestrator instance.
    #[serde(default)]
    pub arbitration: bool,
}

fn default_symbols() -> Vec<String> {
    ["SPY", "QQQ", "AAPL", "MSFT"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_interval_secs() -> u64 {
    300
}

fn default_min_confidence() -> f64 {
    0.7
}

fn default_market_close_hour() -> u32 {
    16
}

fn default_error_backoff_secs() -> u64 {
    10
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            interval_secs: default_interval_secs(),
            min_confidence: default_min_confidence(),
            market_close_hour: default_market_close_hour(),
            error_backoff_secs: default_error_backoff_secs(),
            arbitration: false,
        }
    }
}

/// Option strategy validation bounds
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Minimum days to expiry
    #[serde(default = "default_min_dte")]
    pub min_dte: i64,
    /// Maximum days to expiry
    #[serde(default = "default_max_dte")]
    pub max_dte: i64,
    /// Minimum vertical spread width
    #[serde(default = "default_min_spread_width")]
    pub min_spread_width: Decimal,
    /// Maximum vertical spread width
    #[serde(default = "default_max_spread_width")]
    pub max_spread_width: Decimal,
}

fn default_min_dte() -> i64 {
    7
}

fn default_max_dte() -> i64 {
    45
}

fn default_min_spread_width() -> Decimal {
    dec!(2)
}

fn default_max_spread_width() -> Decimal {
    dec!(10)
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_dte: default_min_dte(),
            max_dte: default_max_dte(),
            min_spread_width: default_min_spread_width(),
            max_spread_width: default_max_spread_width(),
        }
    }
}

/// LLM provider configuration for the arbitration gate
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Provider name: deepseek, openai, ollama
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

fn default_provider() -> String {
    "deepseek".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model: None,
            base_url: None,
        }
    }
}
