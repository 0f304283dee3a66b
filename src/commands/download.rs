//! Download command - fetch historical klines from Binance into a CSV file

use anyhow::{Context, Result};
use ladder_backtest::data::{save_csv, BinanceDataFetcher};
use std::path::PathBuf;
use tracing::info;

pub fn run(symbol: String, interval: String, bars: u32, output: PathBuf) -> Result<()> {
    info!("Starting data download from Binance");

    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir).context("Failed to create output directory")?;
    }

    let fetcher = BinanceDataFetcher::new()?;
    let candles = fetcher.fetch_recent(&symbol, &interval, bars)?;
    if candles.is_empty() {
        anyhow::bail!("No data fetched for {}", symbol);
    }

    save_csv(&candles, &output)?;

    println!(
        "Downloaded {} {} candles of {} to {}",
        candles.len(),
        interval,
        symbol,
        output.display()
    );

    Ok(())
}
