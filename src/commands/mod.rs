//! Subcommand implementations

pub mod backtest;
pub mod download;
