//! Price history flattening
//!
//! Projects an OHLC table into one chronological sequence of price samples
//! (open, high, low, close per row) anchored at the first occurrence of the
//! strategy's start price.

use crate::error::{SimulationError, SimulationResult};
use crate::Candle;

/// Flattened, start-price-anchored price samples
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    samples: Vec<f64>,
    /// Position of `samples[0]` in the untruncated flattened sequence
    offset: usize,
}

impl PriceHistory {
    /// Flatten candles row by row and truncate at the first exact `start_price`
    pub fn from_candles(candles: &[Candle], start_price: f64) -> SimulationResult<Self> {
        let samples = candles.iter().flat_map(Candle::prices).collect();
        Self::from_samples(samples, start_price)
    }

    /// Truncate an already flattened sequence at the first exact `start_price`
    pub fn from_samples(mut samples: Vec<f64>, start_price: f64) -> SimulationResult<Self> {
        let offset = samples
            .iter()
            .position(|&price| price == start_price)
            .ok_or(SimulationError::StartPriceNotFound(start_price))?;
        samples.drain(..offset);

        tracing::debug!(
            start_price,
            offset,
            samples = samples.len(),
            "Anchored price history"
        );

        Ok(PriceHistory { samples, offset })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples dropped before the start price
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Index of the first sample exactly equal to `price`
    pub fn first_index_of(&self, price: f64) -> Option<usize> {
        self.samples.iter().position(|&sample| sample == price)
    }

    /// Candle row a history index was taken from
    pub fn source_row(&self, index: usize) -> usize {
        (self.offset + index) / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn candles(rows: &[[f64; 4]]) -> Vec<Candle> {
        let start = Utc::now();
        rows.iter()
            .enumerate()
            .map(|(i, [open, high, low, close])| Candle {
                datetime: start + Duration::minutes(15 * i as i64),
                open: *open,
                high: *high,
                low: *low,
                close: *close,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_flattens_in_ohlc_order() {
        let data = candles(&[[10.0, 12.0, 9.0, 11.0], [11.0, 13.0, 10.5, 12.5]]);
        let history = PriceHistory::from_candles(&data, 10.0).unwrap();
        assert_eq!(
            history.samples(),
            &[10.0, 12.0, 9.0, 11.0, 11.0, 13.0, 10.5, 12.5]
        );
        assert_eq!(history.offset(), 0);
    }

    #[test]
    fn test_truncates_at_first_occurrence() {
        let data = candles(&[[10.0, 12.0, 9.0, 11.0], [11.0, 13.0, 10.5, 12.5]]);
        let history = PriceHistory::from_candles(&data, 11.0).unwrap();
        assert_eq!(history.samples(), &[11.0, 11.0, 13.0, 10.5, 12.5]);
        assert_eq!(history.offset(), 3);
        assert_eq!(history.source_row(0), 0);
        assert_eq!(history.source_row(1), 1);
    }

    #[test]
    fn test_missing_start_price() {
        let data = candles(&[[10.0, 12.0, 9.0, 11.0]]);
        assert_eq!(
            PriceHistory::from_candles(&data, 10.5),
            Err(SimulationError::StartPriceNotFound(10.5))
        );
    }

    #[test]
    fn test_first_index_of() {
        let history = PriceHistory::from_samples(vec![5.0, 6.0, 5.0, 7.0], 5.0).unwrap();
        assert_eq!(history.first_index_of(5.0), Some(0));
        assert_eq!(history.first_index_of(7.0), Some(3));
        assert_eq!(history.first_index_of(8.0), None);
    }
}
