//! Pipeline orchestrator — wires the engines together end to end.
//!
//! Stage order (each stage a pure function of already-published panels):
//! straddle signals → discrete signals → ATR → currency ATR → composite
//! signals → risk weights → backtest. Validation happens up front: data
//! integrity first, then configuration coverage, so a bad run fails
//! before any computation starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use straddlelab_core::domain::{
    ConfigurationError, DataIntegrityError, Panel, Universe,
};
use straddlelab_core::indicators::{apply_multipliers, AtrEngine, FirstBarPolicy};
use straddlelab_core::signals::{
    composite_signal, discretize, SignalError, StraddleDeltaEngine,
};
use straddlelab_core::weights::risk_weights;

use crate::backtest::compute_returns;
use crate::config::{ConfigError, StrategyConfig};
use crate::data_loader::{LoadError, MarketData};
use crate::metrics::PerformanceReport;
use crate::progress::PipelineProgress;

/// Errors from the pipeline runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("data integrity error: {0}")]
    Integrity(#[from] DataIntegrityError),
    #[error("configuration mismatch: {0}")]
    Coverage(#[from] ConfigurationError),
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Everything one run produces. Panels are published once and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Content hash of the configuration that produced this result.
    pub run_id: String,
    /// Continuous momentum score per date and asset.
    pub signals: Panel,
    /// Bufferized sign of the momentum score.
    pub discrete: Panel,
    /// State-machine output: direction × score magnitude.
    pub composite: Panel,
    /// Currency-denominated position weights.
    pub weights: Panel,
    /// Lagged, cost-adjusted per-asset returns.
    pub asset_returns: Panel,
    /// Sum of asset returns per date.
    pub portfolio_returns: Vec<f64>,
    /// Summary and drawdown statistics.
    pub report: PerformanceReport,
}

/// Run the full pipeline over materialized market data.
pub fn run_pipeline(
    data: &MarketData,
    config: &StrategyConfig,
    progress: &dyn PipelineProgress,
) -> Result<PipelineResult, RunError> {
    let universe = config.universe()?;

    progress.on_stage_start("validating inputs");
    validate_history(data, &universe)?;
    universe.validate_coverage(&data.prices, &data.fx, &data.rates)?;
    progress.on_stage_complete("validating inputs");

    progress.on_stage_start("computing straddle signals");
    let signals = StraddleDeltaEngine.compute(&data.prices.last, &data.rates, &universe)?;
    let discrete = discretize(&signals, &universe);
    progress.on_stage_complete("computing straddle signals");

    progress.on_stage_start("computing true-range estimate");
    let atr = AtrEngine { first_bar: FirstBarPolicy::ZeroPrevClose }
        .compute(&data.prices, &universe);
    let usd_atr = apply_multipliers(&atr, &data.fx, &universe);
    progress.on_stage_complete("computing true-range estimate");

    progress.on_stage_start("computing composite signals");
    let composite = composite_signal(&signals, &discrete, &data.prices.last, &universe);
    progress.on_stage_complete("computing composite signals");

    progress.on_stage_start("computing weights");
    let weights = risk_weights(&composite, &data.prices.last, &data.fx, &usd_atr, &universe);
    progress.on_stage_complete("computing weights");

    progress.on_stage_start("backtesting");
    let price_returns = data.prices.last.pct_change();
    let (asset_returns, portfolio_returns) =
        compute_returns(&price_returns, &weights, &universe);
    let report = PerformanceReport::compute(&portfolio_returns);
    progress.on_stage_complete("backtesting");

    Ok(PipelineResult {
        run_id: config.run_id(),
        signals,
        discrete,
        composite,
        weights,
        asset_returns,
        portfolio_returns,
        report,
    })
}

/// Reject runs whose windows can never fit, and fx panels on a different
/// date axis than the prices they will be joined against.
fn validate_history(data: &MarketData, universe: &Universe) -> Result<(), DataIntegrityError> {
    let n = data.prices.dates().len();
    for asset in data.prices.assets() {
        if let Some(cfg) = universe.get(asset) {
            let longest = cfg.straddle_lookback.max(cfg.atr_lookback);
            if longest > n {
                return Err(DataIntegrityError::LookbackExceedsHistory {
                    asset: asset.clone(),
                    lookback: longest,
                    available: n,
                });
            }
        }
    }
    if data.fx.dates() != data.prices.dates() {
        return Err(DataIntegrityError::FieldAxisMismatch {
            field: "fx".to_string(),
            axis: "date".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use crate::synthetic::synthetic_market_data;

    fn small_config() -> StrategyConfig {
        StrategyConfig::from_toml_str(
            r#"
            [defaults]
            start_date = "2018-01-02"
            straddle_lookback = 20
            atr_lookback = 20
            entry_window = 10
            exit_window = 5
            breakout = true
            buffer = 0.1
            risk_target = 1000.0
            scheme_value = 1000000.0

            [[assets]]
            name = "GOLD"
            futures_multiplier = 10.0
            fx_multiplier = 1.0
            commission = 0.0001

            [[assets]]
            name = "BUND"
            futures_multiplier = 10.0
            fx_multiplier = 1.0
            commission = 0.0001
            "#,
        )
        .unwrap()
    }

    #[test]
    fn runs_end_to_end_on_synthetic_data() {
        let data = synthetic_market_data(&["GOLD", "BUND"], 120, 42);
        let result = run_pipeline(&data, &small_config(), &SilentProgress).unwrap();

        assert_eq!(result.weights.n_dates(), 120);
        assert_eq!(result.portfolio_returns.len(), 120);
        assert!(!result.report.non_finite_inputs);
        // Pre-coverage weights are flat.
        for t in 0..19 {
            assert_eq!(result.weights.get(t, 0), 0.0);
        }
    }

    #[test]
    fn rejects_lookback_longer_than_history() {
        let data = synthetic_market_data(&["GOLD", "BUND"], 10, 42);
        let err = run_pipeline(&data, &small_config(), &SilentProgress).unwrap_err();
        assert!(matches!(
            err,
            RunError::Integrity(DataIntegrityError::LookbackExceedsHistory { lookback: 20, .. })
        ));
    }

    #[test]
    fn rejects_asset_without_config() {
        let data = synthetic_market_data(&["GOLD", "BUND", "COPPER"], 120, 42);
        let err = run_pipeline(&data, &small_config(), &SilentProgress).unwrap_err();
        assert!(matches!(
            err,
            RunError::Coverage(ConfigurationError::MissingAsset { ref asset, .. }) if asset == "COPPER"
        ));
    }

    #[test]
    fn run_id_flows_from_config() {
        let data = synthetic_market_data(&["GOLD", "BUND"], 120, 42);
        let config = small_config();
        let result = run_pipeline(&data, &config, &SilentProgress).unwrap();
        assert_eq!(result.run_id, config.run_id());
    }
}
