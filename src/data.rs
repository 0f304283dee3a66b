//! Data loading and management
//!
//! Reads and writes OHLCV CSV files and fetches klines from the Binance
//! public API. `DataLoader` downloads once into the configured CSV and reads
//! it from disk on every later run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

use crate::{Candle, DataConfig};

// =============================================================================
// Constants
// =============================================================================

const BINANCE_KLINES_URL: &str = "https://api.binance.com/api/v3/klines";

/// Binance per-request kline limit
const MAX_KLINES_PER_REQUEST: u32 = 1000;

const REQUEST_DELAY_MS: u64 = 100;

// =============================================================================
// CSV Data Loading
// =============================================================================

#[derive(Debug, Deserialize)]
struct CandleRow {
    #[serde(alias = "datetime")]
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // No timezone, assume UTC
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        })
        .with_context(|| format!("Failed to parse datetime: {}", s))
}

/// Read OHLCV rows in file order.
///
/// Columns are matched by header name; unknown columns, such as a leading
/// unnamed index column, are ignored.
pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut candles = Vec::new();

    for (row_idx, result) in reader.deserialize::<CandleRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        candles.push(Candle {
            datetime: parse_datetime(&row.date)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    Ok(candles)
}

/// Load OHLCV data from CSV file
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Candle>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("Failed to open CSV file {}", path.as_ref().display()))?;
    read_candles(file)
}

/// Save candles to CSV file
pub fn save_csv(candles: &[Candle], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).context("Failed to create output file")?;

    writer.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for candle in candles {
        writer.write_record(&[
            candle.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            candle.open.to_string(),
            candle.high.to_string(),
            candle.low.to_string(),
            candle.close.to_string(),
            candle.volume.to_string(),
        ])?;
    }
    writer.flush()?;

    info!("Saved {} rows to {}", candles.len(), path.display());
    Ok(())
}

// =============================================================================
// Binance Data Fetcher
// =============================================================================

/// Parse one kline array: [open_time, open, high, low, close, volume, ...]
fn parse_kline(raw: &[serde_json::Value]) -> Option<Candle> {
    if raw.len() < 6 {
        return None;
    }

    Some(Candle {
        datetime: DateTime::from_timestamp_millis(raw[0].as_i64()?)?,
        open: raw[1].as_str()?.parse().ok()?,
        high: raw[2].as_str()?.parse().ok()?,
        low: raw[3].as_str()?.parse().ok()?,
        close: raw[4].as_str()?.parse().ok()?,
        volume: raw[5].as_str()?.parse().ok()?,
    })
}

/// Fetch historical klines from the Binance public API (no API key needed)
pub struct BinanceDataFetcher {
    client: reqwest::blocking::Client,
    request_delay: StdDuration,
}

impl BinanceDataFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            request_delay: StdDuration::from_millis(REQUEST_DELAY_MS),
        })
    }

    /// Fetch up to `limit` klines ending at `end_time` (latest if `None`)
    pub fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        end_time: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Candle>> {
        let mut params = vec![
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.min(MAX_KLINES_PER_REQUEST).to_string()),
        ];
        if let Some(end) = end_time {
            params.push(("endTime", end.timestamp_millis().to_string()));
        }

        let response = self
            .client
            .get(BINANCE_KLINES_URL)
            .query(&params)
            .send()
            .context("Failed to send request to Binance")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Binance API error {}: {}", status, body);
        }

        let raw: Vec<Vec<serde_json::Value>> =
            response.json().context("Failed to parse Binance response")?;

        Ok(raw.iter().filter_map(|row| parse_kline(row)).collect())
    }

    /// Fetch the most recent `n_bars` klines, paging backwards in time
    pub fn fetch_recent(&self, symbol: &str, interval: &str, n_bars: u32) -> Result<Vec<Candle>> {
        info!("Fetching {} {} bars of {} from Binance", n_bars, interval, symbol);

        let mut all_candles: Vec<Candle> = Vec::new();
        let mut end_time: Option<DateTime<Utc>> = None;

        while all_candles.len() < n_bars as usize {
            let remaining = n_bars - all_candles.len() as u32;
            let candles = self.fetch_candles(symbol, interval, end_time, remaining)?;

            let Some(oldest) = candles.iter().map(|c| c.datetime).min() else {
                warn!("No more data available before {:?}", end_time);
                break;
            };
            if end_time.is_some_and(|end| oldest >= end) {
                break;
            }

            all_candles.extend(candles);
            end_time = Some(oldest - chrono::Duration::milliseconds(1));

            sleep(self.request_delay);
        }

        all_candles.sort_by_key(|c| c.datetime);
        all_candles.dedup_by_key(|c| c.datetime);
        if all_candles.len() > n_bars as usize {
            all_candles.drain(..all_candles.len() - n_bars as usize);
        }

        info!("Total candles fetched: {}", all_candles.len());
        Ok(all_candles)
    }
}

// =============================================================================
// Cached Loader
// =============================================================================

/// Loads the configured CSV, downloading it first if it does not exist
pub struct DataLoader {
    config: DataConfig,
    path: PathBuf,
}

impl DataLoader {
    pub fn new(config: DataConfig) -> Self {
        let path = config.csv_path();
        Self { config, path }
    }

    /// Read from an explicit file instead of the configured cache path
    pub fn with_path(config: DataConfig, path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_data(&self) -> Result<Vec<Candle>> {
        if !self.path.exists() {
            self.store_trading_data()?;
        }

        let candles = load_csv(&self.path)?;
        info!(
            "Loaded {} candles of {} {} ({}) from {}",
            candles.len(),
            self.config.symbol,
            self.config.interval,
            self.config.exchange,
            self.path.display()
        );

        let validation = validate_candles(&candles);
        for warning in validation.warnings.iter().chain(&validation.errors) {
            warn!("{}", warning);
        }

        Ok(candles)
    }

    fn store_trading_data(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).context("Failed to create data directory")?;
        }

        let fetcher = BinanceDataFetcher::new()?;
        let candles =
            fetcher.fetch_recent(&self.config.symbol, &self.config.interval, self.config.n_bars)?;
        if candles.is_empty() {
            anyhow::bail!("No data fetched for {}", self.config.symbol);
        }

        save_csv(&candles, &self.path)
    }
}

// =============================================================================
// Data Validation
// =============================================================================

/// Validate candle data for consistency
pub fn validate_candles(candles: &[Candle]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if candles.is_empty() {
        errors.push("No candles provided".to_string());
        return ValidationResult { errors, warnings };
    }

    for (i, candle) in candles.iter().enumerate() {
        if let Err(e) = candle.validate() {
            errors.push(format!("Candle {}: {}", i, e));
        }
        if i > 0 && candle.datetime <= candles[i - 1].datetime {
            warnings.push(format!("Candle {}: not chronological", i));
        }
    }

    ValidationResult { errors, warnings }
}

/// Result of data validation
#[derive(Debug)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
