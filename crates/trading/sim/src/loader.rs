//! CSV tick ingestion
//!
//! Format: header line `symbol,timestamp,price,volume,side`, then one
//! record per line with `price` as a decimal number (scaled by 10000
//! into fixed-point here), `timestamp` as integer nanoseconds,
//! `volume` as an integer, and `side` as the literal `BUY` or `SELL`.
//! Malformed records are skipped, not fatal.

use common::{Px, Qty, Side, Tick, Ts};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from tick ingestion
#[derive(Debug, Error)]
pub enum DataError {
    /// The data file could not be opened
    #[error("failed to open {path}: {source}")]
    Open {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// Reading from an open file failed
    #[error("i/o error while reading ticks: {0}")]
    Io(#[from] io::Error),
}

/// Load a tick stream from a CSV file
///
/// # Errors
///
/// Fails only on I/O problems; malformed records are skipped with a
/// debug log line.
pub fn load_ticks(path: &Path) -> Result<Vec<Tick>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut ticks = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line_no == 0 {
            continue; // header
        }
        match parse_record(&line) {
            Some(tick) => ticks.push(tick),
            None => debug!("skipping malformed record at line {}", line_no + 1),
        }
    }

    info!("loaded {} ticks from {}", ticks.len(), path.display());
    Ok(ticks)
}

fn parse_record(line: &str) -> Option<Tick> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 5 {
        return None;
    }

    let symbol = fields[0].trim();
    if symbol.is_empty() {
        return None;
    }
    let timestamp: u64 = fields[1].trim().parse().ok()?;
    let price: f64 = fields[2].trim().parse().ok()?;
    let volume: i64 = fields[3].trim().parse().ok()?;
    let side = match fields[4].trim() {
        "BUY" => Side::Buy,
        "SELL" => Side::Sell,
        _ => return None,
    };
    if !price.is_finite() || price <= 0.0 || volume <= 0 {
        return None;
    }

    Some(Tick {
        symbol: symbol.to_string(),
        price: Px::new(price),
        volume: Qty::from_i64(volume),
        timestamp: Ts::from_nanos(timestamp),
        side,
    })
}
