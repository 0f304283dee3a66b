//! Price ladder calculation
//!
//! Turns the strategy's percentage offsets into concrete buy and sell
//! target prices.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::StrategyConfig;

/// Decimal places of ladder prices
pub const PRICE_DECIMALS: u32 = 2;

/// Round a float to `dp` decimal places, half to even on the exact binary value.
///
/// A double like 99.005 is stored just below the midpoint and rounds to 99.0.
pub fn round_price(value: f64, dp: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Buy target for every rung.
///
/// Offsets compound: each rung moves the running price by
/// `start_price * percent`, starting from `start_price`. Only the emitted
/// value is rounded; the running price is carried unrounded.
pub fn buy_ladder(strategy: &StrategyConfig) -> Vec<f64> {
    let mut price = strategy.start_price;
    strategy
        .input_percents
        .iter()
        .map(|percent| {
            price += strategy.start_price * percent;
            round_price(price, PRICE_DECIMALS)
        })
        .collect()
}

/// Sell target for every rung, marked up pointwise from the rung's buy target
pub fn sell_ladder(strategy: &StrategyConfig) -> Vec<f64> {
    buy_ladder(strategy)
        .into_iter()
        .zip(&strategy.output_percents)
        .map(|(buy_price, percent)| round_price(buy_price * (1.0 + percent), PRICE_DECIMALS))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(start_price: f64, inputs: Vec<f64>, outputs: Vec<f64>) -> StrategyConfig {
        StrategyConfig {
            start_price,
            input_percents: inputs,
            output_percents: outputs,
            ..StrategyConfig::default()
        }
    }

    #[test]
    fn test_round_price_half_even_on_binary_value() {
        assert_eq!(round_price(99.005, 2), 99.0);
        assert_eq!(round_price(2.675, 2), 2.67);
        assert_eq!(round_price(0.125, 2), 0.12);
        assert_eq!(round_price(100.984, 2), 100.98);
        assert_eq!(round_price(26167.88633, 2), 26167.89);
    }

    #[test]
    fn test_ladder_lengths() {
        let s = StrategyConfig::default();
        assert_eq!(buy_ladder(&s).len(), s.input_percents.len());
        assert_eq!(sell_ladder(&s).len(), s.input_percents.len());
    }

    #[test]
    fn test_buy_ladder_is_cumulative() {
        let s = strategy(100.0, vec![-0.01, -0.02], vec![0.0, 0.0]);
        let ladder = buy_ladder(&s);
        let first = round_price(100.0 + 100.0 * -0.01, 2);
        assert_eq!(ladder[0], 99.0);
        assert_eq!(ladder[1], round_price(first + 100.0 * -0.02, 2));
        assert_eq!(ladder[1], 97.0);
        // Pointwise would have given 98.0
        assert_ne!(ladder[1], round_price(100.0 + 100.0 * -0.02, 2));
    }

    #[test]
    fn test_sell_ladder_is_pointwise() {
        let s = strategy(100.0, vec![-0.01, -0.02], vec![0.02, 0.03]);
        let buys = buy_ladder(&s);
        let sells = sell_ladder(&s);
        for i in 0..buys.len() {
            assert_eq!(sells[i], round_price(buys[i] * (1.0 + s.output_percents[i]), 2));
        }
        assert_eq!(sells, vec![100.98, 99.91]);
    }

    #[test]
    fn test_default_ladder() {
        let s = StrategyConfig::default();
        assert_eq!(buy_ladder(&s), vec![26167.89, 26036.72, 25774.38]);
    }

    #[test]
    fn test_ladders_are_repeatable() {
        let s = StrategyConfig::default();
        assert_eq!(buy_ladder(&s), buy_ladder(&s));
        assert_eq!(sell_ladder(&s), sell_ladder(&s));
    }
}
