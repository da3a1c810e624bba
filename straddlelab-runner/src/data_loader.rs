//! CSV market-data loading.
//!
//! Expects wide CSV files: the first column is an ISO date, every other
//! column one asset. Blank cells become NaN. A data directory holds:
//! - `last.csv`, `high.csv`, `low.csv` — the three price fields
//! - `fx.csv` — fx conversion prices, same shape
//! - `rates.csv` — two columns, date and risk-free rate in percent

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use straddlelab_core::domain::{DataIntegrityError, Panel, PricePanel, RateSeries};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{file}: row {row} has no date cell")]
    MissingDate { file: String, row: usize },
    #[error("{file}: cannot parse '{value}' as a date (row {row})")]
    BadDate {
        file: String,
        value: String,
        row: usize,
    },
    #[error("{file}: cannot parse '{value}' as a number (row {row})")]
    BadNumber {
        file: String,
        value: String,
        row: usize,
    },
    #[error("{file}: header must start with a date column followed by asset names")]
    BadHeader { file: String },
    #[error("data integrity: {0}")]
    Integrity(#[from] DataIntegrityError),
}

/// All inputs the pipeline consumes, already materialized.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub prices: PricePanel,
    pub fx: Panel,
    pub rates: RateSeries,
}

/// Load the five CSV files from a directory.
pub fn load_market_data(dir: &Path) -> Result<MarketData, LoadError> {
    let last = read_panel(&dir.join("last.csv"))?;
    let high = read_panel(&dir.join("high.csv"))?;
    let low = read_panel(&dir.join("low.csv"))?;
    let fx = read_panel(&dir.join("fx.csv"))?;
    let rates = read_rates(&dir.join("rates.csv"))?;
    Ok(MarketData {
        prices: PricePanel::new(last, high, low)?,
        fx,
        rates,
    })
}

/// Read one wide CSV into a panel.
pub fn read_panel(path: &Path) -> Result<Panel, LoadError> {
    let file = path.display().to_string();
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(LoadError::BadHeader { file });
    }
    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2; // 1-based, after the header
        let raw_date = record.get(0).ok_or_else(|| LoadError::MissingDate {
            file: file.clone(),
            row,
        })?;
        dates.push(parse_date(raw_date, &file, row)?);
        let mut values = Vec::with_capacity(assets.len());
        for cell in record.iter().skip(1) {
            values.push(parse_cell(cell, &file, row)?);
        }
        values.resize(assets.len(), f64::NAN);
        rows.push(values);
    }

    let columns = assets
        .into_iter()
        .enumerate()
        .map(|(a, asset)| {
            let col = rows.iter().map(|r| r[a]).collect();
            (asset, col)
        })
        .collect();
    Ok(Panel::from_columns(dates, columns)?)
}

/// Read the two-column rate CSV.
pub fn read_rates(path: &Path) -> Result<RateSeries, LoadError> {
    let file = path.display().to_string();
    let mut reader = csv::Reader::from_path(path)?;

    let mut entries = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2;
        let raw_date = record.get(0).ok_or_else(|| LoadError::MissingDate {
            file: file.clone(),
            row,
        })?;
        let date = parse_date(raw_date, &file, row)?;
        let rate = match record.get(1) {
            Some(cell) => parse_cell(cell, &file, row)?,
            None => f64::NAN,
        };
        entries.push((date, rate));
    }
    Ok(RateSeries::new(entries)?)
}

fn parse_date(raw: &str, file: &str, row: usize) -> Result<NaiveDate, LoadError> {
    raw.trim()
        .parse::<NaiveDate>()
        .map_err(|_| LoadError::BadDate {
            file: file.to_string(),
            value: raw.to_string(),
            row,
        })
}

fn parse_cell(raw: &str, file: &str, row: usize) -> Result<f64, LoadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| LoadError::BadNumber {
        file: file.to_string(),
        value: raw.to_string(),
        row,
    })
}
