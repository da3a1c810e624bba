//! Per-asset static configuration and the universe built from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::panel::{Panel, PricePanel};
use super::rates::RateSeries;

/// A priced asset is missing from one of the tables it must appear in.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("asset '{asset}' present in the price panel but missing from {table}")]
    MissingAsset { asset: String, table: String },
    #[error("no risk-free rate quoted for {date}")]
    MissingRate { date: NaiveDate },
}

/// Static per-asset parameters, immutable for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Contract size of one future.
    pub futures_multiplier: f64,
    /// Extra scaling applied on top of the fx price (e.g. pence to pounds).
    pub fx_multiplier: f64,
    /// Commission charged per unit of traded weight.
    pub commission: f64,
    /// First date the asset may carry a signal.
    pub start_date: NaiveDate,
    /// Straddle momentum window length, in trading days.
    pub straddle_lookback: usize,
    /// EWM span for the true-range estimate.
    pub atr_lookback: usize,
    /// Entry confirmation window (rolling extreme of `last`).
    pub entry_window: usize,
    /// Breakout-exit window (rolling extreme of `last`).
    pub exit_window: usize,
    /// Whether the state machine may exit on breakouts; without it a
    /// position persists until an opposing entry.
    pub breakout: bool,
    /// Dead zone for discretizing the momentum score.
    pub buffer: f64,
    /// Currency risk budget per position.
    pub risk_target: f64,
    /// Total notional fund value normalizing weights.
    pub scheme_value: f64,
    /// Clip weights to be non-negative.
    pub long_only: bool,
}

/// Asset name → configuration for every tradable asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Universe {
    configs: HashMap<String, AssetConfig>,
}

impl Universe {
    pub fn new(configs: HashMap<String, AssetConfig>) -> Self {
        Self { configs }
    }

    pub fn get(&self, asset: &str) -> Option<&AssetConfig> {
        self.configs.get(asset)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Fail fast if any priced asset lacks a config or fx column, or if a
    /// signal-bearing date lacks a rate quote.
    ///
    /// Rates are only required from the earliest date any asset can carry
    /// a signal; price history routinely starts earlier to warm windows up.
    pub fn validate_coverage(
        &self,
        prices: &PricePanel,
        fx: &Panel,
        rates: &RateSeries,
    ) -> Result<(), ConfigurationError> {
        for asset in prices.assets() {
            if !self.configs.contains_key(asset) {
                return Err(ConfigurationError::MissingAsset {
                    asset: asset.clone(),
                    table: "AssetConfig".to_string(),
                });
            }
            if fx.asset_index(asset).is_none() {
                return Err(ConfigurationError::MissingAsset {
                    asset: asset.clone(),
                    table: "FxPanel".to_string(),
                });
            }
        }

        let dates = prices.dates();
        let earliest = prices
            .assets()
            .iter()
            .filter_map(|asset| {
                let cfg = &self.configs[asset];
                coverage_start(dates, cfg.straddle_lookback, cfg.start_date)
            })
            .min();
        if let Some(first) = earliest {
            for &date in &dates[first..] {
                if rates.get(date).is_none() {
                    return Err(ConfigurationError::MissingRate { date });
                }
            }
        }
        Ok(())
    }
}

/// First date index at which an asset's trailing `lookback` window fits
/// inside the panel and the date is at or after `start_date`.
///
/// `None` when the history never becomes long enough or every qualifying
/// date precedes `start_date`'s arrival in the panel.
pub fn coverage_start(dates: &[NaiveDate], lookback: usize, start_date: NaiveDate) -> Option<usize> {
    if lookback == 0 || lookback > dates.len() {
        return None;
    }
    (lookback - 1..dates.len()).find(|&t| dates[t] >= start_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(start_date: NaiveDate) -> AssetConfig {
        AssetConfig {
            futures_multiplier: 100.0,
            fx_multiplier: 1.0,
            commission: 0.0,
            start_date,
            straddle_lookback: 3,
            atr_lookback: 3,
            entry_window: 2,
            exit_window: 2,
            breakout: true,
            buffer: 0.15,
            risk_target: 1000.0,
            scheme_value: 1_000_000.0,
            long_only: false,
        }
    }

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(i)
    }

    #[test]
    fn coverage_needs_full_window() {
        let dates: Vec<NaiveDate> = (0..5).map(day).collect();
        assert_eq!(coverage_start(&dates, 3, day(0)), Some(2));
        assert_eq!(coverage_start(&dates, 5, day(0)), Some(4));
        assert_eq!(coverage_start(&dates, 6, day(0)), None);
    }

    #[test]
    fn coverage_respects_start_date() {
        let dates: Vec<NaiveDate> = (0..5).map(day).collect();
        assert_eq!(coverage_start(&dates, 2, day(3)), Some(3));
        assert_eq!(coverage_start(&dates, 2, day(99)), None);
    }

    #[test]
    fn validate_flags_missing_config() {
        let dates: Vec<NaiveDate> = (0..3).map(day).collect();
        let last = Panel::from_columns(
            dates.clone(),
            vec![("GOLD".into(), vec![1.0, 2.0, 3.0])],
        )
        .unwrap();
        let prices = PricePanel::new(last.clone(), last.clone(), last.clone()).unwrap();
        let fx = Panel::filled_like(&last, 1.0);
        let rates = RateSeries::new(dates.iter().map(|&d| (d, 1.0)).collect()).unwrap();

        let universe = Universe::default();
        let err = universe.validate_coverage(&prices, &fx, &rates).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingAsset { ref table, .. } if table == "AssetConfig"));
    }

    #[test]
    fn validate_flags_missing_fx_column() {
        let dates: Vec<NaiveDate> = (0..3).map(day).collect();
        let last = Panel::from_columns(
            dates.clone(),
            vec![("GOLD".into(), vec![1.0, 2.0, 3.0])],
        )
        .unwrap();
        let prices = PricePanel::new(last.clone(), last.clone(), last.clone()).unwrap();
        let fx = Panel::from_columns(dates.clone(), vec![("BUND".into(), vec![1.0, 1.0, 1.0])])
            .unwrap();
        let rates = RateSeries::new(dates.iter().map(|&d| (d, 1.0)).collect()).unwrap();

        let mut configs = HashMap::new();
        configs.insert("GOLD".to_string(), test_config(day(0)));
        let universe = Universe::new(configs);
        let err = universe.validate_coverage(&prices, &fx, &rates).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingAsset { ref table, .. } if table == "FxPanel"));
    }

    #[test]
    fn validate_requires_rates_from_coverage_start_only() {
        let dates: Vec<NaiveDate> = (0..5).map(day).collect();
        let last = Panel::from_columns(
            dates.clone(),
            vec![("GOLD".into(), vec![1.0, 2.0, 3.0, 4.0, 5.0])],
        )
        .unwrap();
        let prices = PricePanel::new(last.clone(), last.clone(), last.clone()).unwrap();
        let fx = Panel::filled_like(&last, 1.0);

        let mut configs = HashMap::new();
        configs.insert("GOLD".to_string(), test_config(day(0)));
        let universe = Universe::new(configs);

        // Coverage starts at index 2 (lookback 3); rates quoted only there on.
        let rates = RateSeries::new(dates[2..].iter().map(|&d| (d, 1.0)).collect()).unwrap();
        assert!(universe.validate_coverage(&prices, &fx, &rates).is_ok());

        // Drop one covered date and validation fails fast.
        let rates = RateSeries::new(vec![(dates[2], 1.0), (dates[4], 1.0)]).unwrap();
        let err = universe.validate_coverage(&prices, &fx, &rates).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingRate { date } if date == dates[3]));
    }
}
