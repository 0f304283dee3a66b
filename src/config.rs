//! Configuration management
//!
//! Strategy parameters and data source settings, loaded from JSON files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SimulationError, SimulationResult};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        Ok(config)
    }
}

/// Ladder strategy parameters
///
/// `input_percents[i]` and `output_percents[i]` describe rung `i`: the buy
/// offset applied to the running ladder price (as a fraction of the start
/// price) and the markup of the sell over that rung's buy price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub start_price: f64,
    pub input_percents: Vec<f64>,
    pub output_percents: Vec<f64>,
    /// Initial USDT balance
    pub usdt: f64,
    /// Initial crypto balance
    #[serde(default)]
    pub crypto: f64,
    /// Commission rate as a fraction of notional
    #[serde(default = "default_commission")]
    pub commission: f64,
    /// Half-width of the tolerance band around a target price
    #[serde(default = "default_deviation")]
    pub deviation: f64,
}

fn default_commission() -> f64 {
    0.00075
}

fn default_deviation() -> f64 {
    0.001
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            start_price: 26233.47,
            input_percents: vec![-0.0025, -0.005, -0.01],
            output_percents: vec![0.02, 0.03, 0.04],
            usdt: 1000.0,
            crypto: 0.0,
            commission: default_commission(),
            deviation: default_deviation(),
        }
    }
}

impl StrategyConfig {
    /// Number of ladder rungs
    pub fn rung_count(&self) -> usize {
        self.input_percents.len()
    }

    /// Check the invariants a simulation depends on
    pub fn validate(&self) -> SimulationResult<()> {
        if self.input_percents.len() != self.output_percents.len() {
            return Err(SimulationError::LadderLengthMismatch {
                inputs: self.input_percents.len(),
                outputs: self.output_percents.len(),
            });
        }
        if self.input_percents.is_empty() {
            return Err(SimulationError::EmptyLadder);
        }
        if self.start_price <= 0.0 || self.start_price.is_nan() {
            return Err(SimulationError::NonPositiveStartPrice(self.start_price));
        }
        Ok(())
    }
}

/// Historical data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: String,
    pub filename: String,
    pub symbol: String,
    /// Exchange label, informational only
    pub exchange: String,
    pub interval: String,
    /// Number of bars to fetch when no cached CSV exists
    pub n_bars: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: "data".to_string(),
            filename: "trading_data.csv".to_string(),
            symbol: "BTCUSDT".to_string(),
            exchange: "BINANCE".to_string(),
            interval: "15m".to_string(),
            n_bars: 672, // one week of 15m bars
        }
    }
}

impl DataConfig {
    /// Full path of the cached CSV file
    pub fn csv_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_is_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ladder_length_mismatch() {
        let strategy = StrategyConfig {
            input_percents: vec![-0.01, -0.02],
            output_percents: vec![0.02],
            ..StrategyConfig::default()
        };
        assert_eq!(
            strategy.validate(),
            Err(SimulationError::LadderLengthMismatch {
                inputs: 2,
                outputs: 1
            })
        );
    }

    #[test]
    fn test_empty_ladder() {
        let strategy = StrategyConfig {
            input_percents: vec![],
            output_percents: vec![],
            ..StrategyConfig::default()
        };
        assert_eq!(strategy.validate(), Err(SimulationError::EmptyLadder));
    }

    #[test]
    fn test_non_positive_start_price() {
        let strategy = StrategyConfig {
            start_price: 0.0,
            ..StrategyConfig::default()
        };
        assert_eq!(
            strategy.validate(),
            Err(SimulationError::NonPositiveStartPrice(0.0))
        );
    }

    #[test]
    fn test_parse_with_defaults() {
        let json = r#"{
            "strategy": {
                "start_price": 100.0,
                "input_percents": [-0.01],
                "output_percents": [0.02],
                "usdt": 500.0
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.strategy.crypto, 0.0);
        assert_eq!(config.strategy.commission, 0.00075);
        assert_eq!(config.strategy.deviation, 0.001);
        assert_eq!(config.data.symbol, "BTCUSDT");
        assert_eq!(config.data.n_bars, 672);
        assert_eq!(config.data.csv_path(), Path::new("data").join("trading_data.csv"));
    }
}
