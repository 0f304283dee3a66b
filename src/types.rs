//! Core data types used across the backtester

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for candle data
#[derive(Debug, Error)]
pub enum CandleValidationError {
    #[error("high ({high}) must be >= low ({low})")]
    HighLessThanLow { high: f64, low: f64 },

    #[error("volume ({0}) must be >= 0")]
    NegativeVolume(f64),

    #[error("prices must be positive: open={open}, high={high}, low={low}, close={close}")]
    NonPositivePrice {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// OHLCV candlestick data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub datetime: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Price samples of this candle in flattening order: open, high, low, close
    pub fn prices(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }

    /// Validate the candle data
    pub fn validate(&self) -> Result<(), CandleValidationError> {
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(CandleValidationError::NonPositivePrice {
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }

        if self.high < self.low {
            return Err(CandleValidationError::HighLessThanLow {
                high: self.high,
                low: self.low,
            });
        }

        if self.volume < 0.0 {
            return Err(CandleValidationError::NegativeVolume(self.volume));
        }

        Ok(())
    }
}

/// How a sell order was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillKind {
    /// Exact or in-band touch of the sell target at or after the last buy
    Limit,
    /// No qualifying touch; position closed against the tail of the history
    Forced,
}

/// A filled buy order for one ladder rung
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyFill {
    pub rung: usize,
    pub price: f64,
    /// Crypto amount received
    pub quantity: f64,
    pub history_index: usize,
}

/// A filled sell order closing the buy of the same rung
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellFill {
    pub rung: usize,
    pub price: f64,
    /// USDT received
    pub usdt_amount: f64,
    pub history_index: usize,
    pub kind: FillKind,
}

/// Running wallet balances of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Balances {
    pub usdt: f64,
    pub crypto: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            datetime: Utc::now(),
            open,
            high,
            low,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn test_prices_order() {
        let c = candle(1.0, 4.0, 0.5, 2.0);
        assert_eq!(c.prices(), [1.0, 4.0, 0.5, 2.0]);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let c = candle(1.0, 0.5, 4.0, 2.0);
        assert!(matches!(
            c.validate(),
            Err(CandleValidationError::HighLessThanLow { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_price() {
        let c = candle(0.0, 4.0, 0.5, 2.0);
        assert!(matches!(
            c.validate(),
            Err(CandleValidationError::NonPositivePrice { .. })
        ));
    }
}
