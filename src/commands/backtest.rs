//! Backtest command implementation

use anyhow::Result;
use ladder_backtest::data::DataLoader;
use ladder_backtest::{Config, PriceHistory, Report, TransactionSimulator};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn run(
    config_path: String,
    start_price_override: Option<f64>,
    usdt_override: Option<f64>,
    data_file: Option<PathBuf>,
) -> Result<()> {
    info!("Starting backtest");

    let mut config = if Path::new(&config_path).exists() {
        let config = Config::from_file(&config_path)?;
        info!("Loaded configuration from: {}", config_path);
        config
    } else {
        warn!("Config file {} not found, using defaults", config_path);
        Config::default()
    };

    if let Some(start_price) = start_price_override {
        info!("Overriding start price to: {}", start_price);
        config.strategy.start_price = start_price;
    }

    if let Some(usdt) = usdt_override {
        info!("Overriding USDT balance to: {:.2}", usdt);
        config.strategy.usdt = usdt;
    }

    // Configuration errors stop the run before any data is touched
    config.strategy.validate()?;
    debug!("Strategy: {:?}", config.strategy);

    let loader = match data_file {
        Some(path) => DataLoader::with_path(config.data.clone(), path),
        None => DataLoader::new(config.data.clone()),
    };
    let candles = loader.load_data()?;

    let history = PriceHistory::from_candles(&candles, config.strategy.start_price)?;
    info!(
        "Price history anchored at sample {} ({} samples)",
        history.offset(),
        history.len()
    );

    let mut simulator = TransactionSimulator::new(&config.strategy)?;
    let outcome = simulator.make_transactions(&history);

    println!("{}", Report::new(&config.strategy, &outcome, simulator.balances()));

    info!("Backtest completed successfully");

    Ok(())
}
