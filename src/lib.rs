//! Ladder Backtest
//!
//! Backtests a fixed-ladder grid strategy against historical OHLC data:
//! a sequence of limit buys below a start price, matched against the price
//! path that follows, then one limit sell per filled buy, with a profit and
//! commission summary at the end.
//!
//! # Example
//! ```
//! use ladder_backtest::{PriceHistory, StrategyConfig, TransactionSimulator, Report};
//!
//! let strategy = StrategyConfig {
//!     start_price: 100.0,
//!     input_percents: vec![-0.01],
//!     output_percents: vec![0.02],
//!     usdt: 100.0,
//!     ..StrategyConfig::default()
//! };
//!
//! let history = PriceHistory::from_samples(vec![100.0, 99.0, 99.1, 101.2], strategy.start_price)?;
//! let mut simulator = TransactionSimulator::new(&strategy)?;
//! let outcome = simulator.make_transactions(&history);
//!
//! assert_eq!(outcome.buys.len(), 1);
//! println!("{}", Report::new(&strategy, &outcome, simulator.balances()));
//! # Ok::<(), ladder_backtest::SimulationError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod history;
pub mod ladder;
pub mod matcher;
pub mod report;
pub mod simulator;
pub mod types;

pub use config::{Config, DataConfig, StrategyConfig};
pub use error::SimulationError;
pub use history::PriceHistory;
pub use matcher::HistoryMatcher;
pub use report::Report;
pub use simulator::{SimulationOutcome, TransactionSimulator};
pub use types::*;
