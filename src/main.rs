//! Ladder backtest - main entry point
//!
//! This binary provides two subcommands:
//! - backtest: Run one ladder simulation and print the report
//! - download: Download historical klines from Binance into a CSV file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "ladder-backtest")]
#[command(about = "Backtest a fixed-ladder grid strategy against historical OHLC data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a ladder backtest
    Backtest {
        /// Path to configuration file (built-in defaults if it does not exist)
        #[arg(short, long, default_value = "configs/btcusdt_15m.json")]
        config: String,

        /// Strategy start price (overrides config file)
        #[arg(long)]
        start_price: Option<f64>,

        /// Initial USDT balance (overrides config file)
        #[arg(long)]
        usdt: Option<f64>,

        /// Read candles from this CSV instead of the cached download
        #[arg(long)]
        data_file: Option<PathBuf>,
    },

    /// Download historical klines from Binance
    Download {
        /// Trading pair, e.g. "BTCUSDT"
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,

        /// Kline interval, e.g. "15m", "1h"
        #[arg(short, long, default_value = "15m")]
        interval: String,

        /// Number of bars to fetch
        #[arg(short, long, default_value = "672")]
        bars: u32,

        /// Output CSV path
        #[arg(short, long, default_value = "data/trading_data.csv")]
        output: PathBuf,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // Console logs go to stderr; stdout carries only the report
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Backtest { .. } => "backtest",
        Commands::Download { .. } => "download",
    };
    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Backtest {
            config,
            start_price,
            usdt,
            data_file,
        } => commands::backtest::run(config, start_price, usdt, data_file),

        Commands::Download {
            symbol,
            interval,
            bars,
            output,
        } => commands::download::run(symbol, interval, bars, output),
    }
}
