//! StraddleLab Runner — backtest engine, metrics, config, orchestration.
//!
//! This crate builds on `straddlelab-core` to provide:
//! - Lagged, cost-adjusted return computation and drawdown accounting
//! - Summary statistics with a non-finite-input warning flag
//! - Serializable strategy configuration with content-addressed run IDs
//! - CSV market-data loading with a synthetic fallback generator
//! - The end-to-end pipeline orchestrator with stage progress reporting

pub mod backtest;
pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod progress;
pub mod runner;
pub mod synthetic;

pub use backtest::{compute_returns, drawdown, DrawdownSeries};
pub use config::{AssetEntry, ConfigError, SignalDefaults, StrategyConfig};
pub use data_loader::{load_market_data, LoadError, MarketData};
pub use metrics::PerformanceReport;
pub use progress::{PipelineProgress, SilentProgress, StdoutProgress};
pub use runner::{run_pipeline, PipelineResult, RunError};
pub use synthetic::synthetic_market_data;
