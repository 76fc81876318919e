//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/pairs.toml.
//! Only `[strategy]` is required; the other sections fall back to the
//! paper-trading defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::adapters::market_data::{DEFAULT_QUOTE_ASSET, DEFAULT_WS_URL};
use crate::adapters::paper_execution::DEFAULT_STARTING_BALANCE;
use crate::strategy::params::{ConfigError, StrategyConfig};

/// Environment override for `[audit].path`
pub const AUDIT_PATH_ENV: &str = "PAIRS_AUDIT_PATH";
/// Environment override for `[feed].ws_url`
pub const WS_URL_ENV: &str = "PAIRS_WS_URL";

/// Main configuration structure matching config/pairs.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub strategy: StrategySection,
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub execution: ExecutionSection,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Strategy configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    /// Numerator symbol of the traded ratio
    pub asset_a: String,
    /// Denominator symbol of the traded ratio
    pub asset_b: String,
    /// Ratio observations per AR(1) calibration
    pub window_size: usize,
    /// |z| needed to open a spread
    pub z_trigger: f64,
    /// |z| that force-closes an open spread
    pub stop_loss_z: f64,
    /// Asset-A quantity per entry
    pub risk_per_trade: f64,
}

impl Default for StrategySection {
    fn default() -> Self {
        let defaults = StrategyConfig::default();
        Self {
            asset_a: defaults.asset_a,
            asset_b: defaults.asset_b,
            window_size: defaults.window_size,
            z_trigger: defaults.z_trigger,
            stop_loss_z: defaults.stop_loss_z,
            risk_per_trade: defaults.risk_per_trade,
        }
    }
}

/// Tick source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Synthetic mean-reverting pair
    #[default]
    Simulated,
    /// Binance public trade stream
    Binance,
}

/// Market data feed section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    pub mode: FeedMode,
    /// Simulated feed step interval
    pub tick_interval_ms: u64,
    /// Bounded channel capacity between feed and engine
    pub channel_buffer: usize,
    /// Binance WebSocket endpoint, path excluded
    pub ws_url: String,
    /// Quote asset appended to Binance symbols
    pub quote_asset: String,
    /// Delay before reconnecting a dropped stream
    pub reconnect_backoff_ms: u64,
    /// Fixed RNG seed for reproducible simulations
    pub seed: Option<u64>,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            mode: FeedMode::Simulated,
            tick_interval_ms: 100,
            channel_buffer: 1_024,
            ws_url: DEFAULT_WS_URL.to_string(),
            quote_asset: DEFAULT_QUOTE_ASSET.to_string(),
            reconnect_backoff_ms: 1_000,
            seed: None,
        }
    }
}

/// Paper execution section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    pub starting_balance: f64,
    /// Settle BUY/SELL in cash at this constant price
    pub fill_price: Option<f64>,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            fill_price: None,
        }
    }
}

/// Audit trail section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// CSV trade log path, `~` allowed
    pub path: String,
    pub enabled: bool,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            path: "trade_log.csv".to_string(),
            enabled: true,
        }
    }
}

impl AuditSection {
    /// Path with `~` expanded to the home directory
    pub fn expanded_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "warn".to_string() }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid strategy parameters: {0}")]
    StrategyError(#[from] ConfigError),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file, applying environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, LoaderError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    config.apply_overrides(
        std::env::var(AUDIT_PATH_ENV).ok(),
        std::env::var(WS_URL_ENV).ok(),
    );
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Replace file values with explicit overrides (empty strings ignored)
    pub fn apply_overrides(&mut self, audit_path: Option<String>, ws_url: Option<String>) {
        if let Some(path) = audit_path.filter(|p| !p.trim().is_empty()) {
            tracing::debug!(path = %path, "audit path overridden from environment");
            self.audit.path = path;
        }
        if let Some(url) = ws_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(url = %url, "websocket url overridden from environment");
            self.feed.ws_url = url;
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), LoaderError> {
        StrategyConfig::from(self).validate()?;

        if self.feed.channel_buffer == 0 {
            return Err(LoaderError::ValidationError(
                "channel_buffer must be >= 1".to_string(),
            ));
        }

        if self.feed.mode == FeedMode::Binance && self.feed.ws_url.trim().is_empty() {
            return Err(LoaderError::ValidationError(
                "ws_url cannot be empty in binance mode".to_string(),
            ));
        }

        if !self.execution.starting_balance.is_finite() || self.execution.starting_balance < 0.0 {
            return Err(LoaderError::ValidationError(format!(
                "starting_balance must be >= 0, got {}",
                self.execution.starting_balance
            )));
        }

        if let Some(price) = self.execution.fill_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(LoaderError::ValidationError(format!(
                    "fill_price must be > 0, got {}",
                    price
                )));
            }
        }

        if self.audit.enabled && self.audit.path.trim().is_empty() {
            return Err(LoaderError::ValidationError(
                "audit path cannot be empty when audit is enabled".to_string(),
            ));
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(LoaderError::ValidationError(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

// Conversion from Config to StrategyConfig
impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        StrategyConfig {
            asset_a: config.strategy.asset_a.clone(),
            asset_b: config.strategy.asset_b.clone(),
            window_size: config.strategy.window_size,
            z_trigger: config.strategy.z_trigger,
            stop_loss_z: config.strategy.stop_loss_z,
            risk_per_trade: config.strategy.risk_per_trade,
        }
    }
}
