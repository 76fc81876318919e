//! Strategy Parameters
//!
//! Configuration for the pair engine. Defaults match the reference
//! ETH/BTC deployment: a 300-tick window, entries at 3 sigma, hard exit
//! at 5 sigma.

use serde::{Deserialize, Serialize};

/// Smallest window that still yields two regression pairs
pub const MIN_WINDOW_SIZE: usize = 3;

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Numerator leg of the ratio
    pub asset_a: String,
    /// Denominator leg of the ratio
    pub asset_b: String,
    /// Number of ratio observations used for calibration
    pub window_size: usize,
    /// |z| needed to open a spread
    pub z_trigger: f64,
    /// |z| that forces an open spread closed
    pub stop_loss_z: f64,
    /// Quantity of asset A per entry
    pub risk_per_trade: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            asset_a: "ETH".to_string(),
            asset_b: "BTC".to_string(),
            window_size: 300,
            z_trigger: 3.0,
            stop_loss_z: 5.0,
            risk_per_trade: 0.1,
        }
    }
}

impl StrategyConfig {
    pub fn with_assets(mut self, asset_a: impl Into<String>, asset_b: impl Into<String>) -> Self {
        self.asset_a = asset_a.into();
        self.asset_b = asset_b.into();
        self
    }

    pub fn with_window(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_thresholds(mut self, z_trigger: f64, stop_loss_z: f64) -> Self {
        self.z_trigger = z_trigger;
        self.stop_loss_z = stop_loss_z;
        self
    }

    pub fn with_risk_per_trade(mut self, risk_per_trade: f64) -> Self {
        self.risk_per_trade = risk_per_trade;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.asset_a.trim().is_empty() || self.asset_b.trim().is_empty() {
            return Err(ConfigError::MissingAsset);
        }
        if self.asset_a == self.asset_b {
            return Err(ConfigError::DuplicateAsset(self.asset_a.clone()));
        }
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(ConfigError::InvalidWindow(self.window_size));
        }
        if !self.z_trigger.is_finite() || self.z_trigger <= 0.0 {
            return Err(ConfigError::InvalidZTrigger(self.z_trigger));
        }
        if !self.stop_loss_z.is_finite() || self.stop_loss_z <= self.z_trigger {
            return Err(ConfigError::InvalidStopLoss {
                stop_loss_z: self.stop_loss_z,
                z_trigger: self.z_trigger,
            });
        }
        if !self.risk_per_trade.is_finite() || self.risk_per_trade <= 0.0 {
            return Err(ConfigError::InvalidRiskPerTrade(self.risk_per_trade));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Both asset_a and asset_b must be set")]
    MissingAsset,
    #[error("asset_a and asset_b must differ (both are {0})")]
    DuplicateAsset(String),
    #[error("Invalid window size: {0} (minimum 3)")]
    InvalidWindow(usize),
    #[error("Invalid z_trigger: {0} (must be > 0)")]
    InvalidZTrigger(f64),
    #[error("Invalid stop_loss_z: {stop_loss_z} (must exceed z_trigger {z_trigger})")]
    InvalidStopLoss { stop_loss_z: f64, z_trigger: f64 },
    #[error("Invalid risk_per_trade: {0} (must be > 0)")]
    InvalidRiskPerTrade(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StrategyConfig::default();
        assert_eq!(config.asset_a, "ETH");
        assert_eq!(config.asset_b, "BTC");
        assert_eq!(config.window_size, 300);
        assert_eq!(config.z_trigger, 3.0);
        assert_eq!(config.stop_loss_z, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StrategyConfig::default()
            .with_assets("SOL", "ETH")
            .with_window(30)
            .with_thresholds(2.0, 4.0)
            .with_risk_per_trade(0.5);
        assert_eq!(config.asset_a, "SOL");
        assert_eq!(config.window_size, 30);
        assert_eq!(config.z_trigger, 2.0);
        assert_eq!(config.stop_loss_z, 4.0);
        assert_eq!(config.risk_per_trade, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_window() {
        let config = StrategyConfig::default().with_window(2);
        assert_eq!(config.validate(), Err(ConfigError::InvalidWindow(2)));
        assert!(StrategyConfig::default().with_window(3).validate().is_ok());
    }

    #[test]
    fn test_invalid_thresholds() {
        let config = StrategyConfig::default().with_thresholds(0.0, 5.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidZTrigger(_))));

        let config = StrategyConfig::default().with_thresholds(3.0, 3.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidStopLoss { .. })));

        let config = StrategyConfig::default().with_thresholds(f64::NAN, 5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_assets() {
        let config = StrategyConfig::default().with_assets("ETH", "ETH");
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateAsset(_))));

        let config = StrategyConfig::default().with_assets("", "BTC");
        assert_eq!(config.validate(), Err(ConfigError::MissingAsset));
    }

    #[test]
    fn test_invalid_risk() {
        let config = StrategyConfig::default().with_risk_per_trade(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRiskPerTrade(_))));
    }
}
