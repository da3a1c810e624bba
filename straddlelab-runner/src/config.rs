//! Serializable strategy configuration.
//!
//! A config file carries signal defaults plus one entry per asset; any
//! entry may override any default. `universe()` resolves the overrides
//! into the per-asset records the engines consume. Configs hash to a
//! deterministic run ID so two identical runs are recognizably the same.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use straddlelab_core::domain::{AssetConfig, Universe};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config lists no assets")]
    EmptyUniverse,
    #[error("asset '{0}' listed twice")]
    DuplicateAsset(String),
    #[error("asset '{asset}': straddle lookback {value} is too short (need at least 2)")]
    LookbackTooShort { asset: String, value: usize },
    #[error("asset '{asset}': {field} must be positive")]
    NonPositive { asset: String, field: String },
}

/// Signal parameters shared by every asset unless overridden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalDefaults {
    pub start_date: NaiveDate,
    pub straddle_lookback: usize,
    pub atr_lookback: usize,
    pub entry_window: usize,
    pub exit_window: usize,
    pub breakout: bool,
    pub buffer: f64,
    pub risk_target: f64,
    pub scheme_value: f64,
    #[serde(default)]
    pub long_only: bool,
}

/// One tradable asset: contract economics plus optional overrides of the
/// signal defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetEntry {
    pub name: String,
    pub futures_multiplier: f64,
    pub fx_multiplier: f64,
    pub commission: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub straddle_lookback: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atr_lookback: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakout: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_only: Option<bool>,
}

/// Complete strategy configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    pub defaults: SignalDefaults,
    pub assets: Vec<AssetEntry>,
}

impl StrategyConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: StrategyConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Deterministic content hash identifying this configuration.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("StrategyConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Resolve defaults and overrides into the per-asset universe.
    pub fn universe(&self) -> Result<Universe, ConfigError> {
        self.validate()?;
        let mut configs = HashMap::new();
        for entry in &self.assets {
            let d = &self.defaults;
            configs.insert(
                entry.name.clone(),
                AssetConfig {
                    futures_multiplier: entry.futures_multiplier,
                    fx_multiplier: entry.fx_multiplier,
                    commission: entry.commission,
                    start_date: entry.start_date.unwrap_or(d.start_date),
                    straddle_lookback: entry.straddle_lookback.unwrap_or(d.straddle_lookback),
                    atr_lookback: entry.atr_lookback.unwrap_or(d.atr_lookback),
                    entry_window: entry.entry_window.unwrap_or(d.entry_window),
                    exit_window: entry.exit_window.unwrap_or(d.exit_window),
                    breakout: entry.breakout.unwrap_or(d.breakout),
                    buffer: entry.buffer.unwrap_or(d.buffer),
                    risk_target: entry.risk_target.unwrap_or(d.risk_target),
                    scheme_value: entry.scheme_value.unwrap_or(d.scheme_value),
                    long_only: entry.long_only.unwrap_or(d.long_only),
                },
            );
        }
        Ok(Universe::new(configs))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        let mut seen = std::collections::HashSet::new();
        for entry in &self.assets {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateAsset(entry.name.clone()));
            }
            let lookback = entry
                .straddle_lookback
                .unwrap_or(self.defaults.straddle_lookback);
            if lookback < 2 {
                return Err(ConfigError::LookbackTooShort {
                    asset: entry.name.clone(),
                    value: lookback,
                });
            }
            for (field, value) in [
                ("atr_lookback", entry.atr_lookback.unwrap_or(self.defaults.atr_lookback) as f64),
                ("entry_window", entry.entry_window.unwrap_or(self.defaults.entry_window) as f64),
                ("exit_window", entry.exit_window.unwrap_or(self.defaults.exit_window) as f64),
                ("risk_target", entry.risk_target.unwrap_or(self.defaults.risk_target)),
                ("scheme_value", entry.scheme_value.unwrap_or(self.defaults.scheme_value)),
                ("futures_multiplier", entry.futures_multiplier),
                ("fx_multiplier", entry.fx_multiplier),
            ] {
                if value <= 0.0 {
                    return Err(ConfigError::NonPositive {
                        asset: entry.name.clone(),
                        field: field.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
