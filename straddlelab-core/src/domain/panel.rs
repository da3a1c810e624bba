//! Panel — the fundamental data unit: a date-by-asset table of floats.
//!
//! Storage is column-major (one contiguous slice per asset), because every
//! pipeline stage walks one asset's history at a time. Cells may be NaN;
//! NaN means "missing or degenerate" and flows through arithmetic untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integrity failures detected before any computation runs.
#[derive(Debug, Error)]
pub enum DataIntegrityError {
    #[error("empty date axis")]
    EmptyDates,
    #[error("dates not strictly increasing at position {position}: {prev} then {next}")]
    NonMonotonicDates {
        position: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },
    #[error("column '{asset}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        asset: String,
        expected: usize,
        actual: usize,
    },
    #[error("price fields disagree: '{field}' has a different {axis} axis than 'last'")]
    FieldAxisMismatch { field: String, axis: String },
    #[error("asset '{asset}': lookback {lookback} exceeds available history ({available} dates)")]
    LookbackExceedsHistory {
        asset: String,
        lookback: usize,
        available: usize,
    },
}

/// Date-indexed, asset-keyed table of `f64` values.
///
/// Invariants, enforced at construction:
/// - the date axis is non-empty and strictly increasing (no duplicates);
/// - every asset column has exactly one value per date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    /// Column-major: `values[a * dates.len() + t]`.
    values: Vec<f64>,
}

impl Panel {
    /// Build a panel from per-asset columns. Columns must all match the
    /// date axis length.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, DataIntegrityError> {
        validate_dates(&dates)?;
        let n = dates.len();
        let mut assets = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len() * n);
        for (asset, col) in columns {
            if col.len() != n {
                return Err(DataIntegrityError::ColumnLengthMismatch {
                    asset,
                    expected: n,
                    actual: col.len(),
                });
            }
            assets.push(asset);
            values.extend(col);
        }
        Ok(Self {
            dates,
            assets,
            values,
        })
    }

    /// A panel filled with a constant value over the same axes as `like`.
    pub fn filled_like(like: &Panel, value: f64) -> Self {
        Self {
            dates: like.dates.clone(),
            assets: like.assets.clone(),
            values: vec![value; like.values.len()],
        }
    }

    /// A panel over the same axes as `like`, with columns produced by
    /// `f(asset_index, column) -> Vec<f64>`.
    ///
    /// Panics if `f` returns a column of the wrong length; producers are
    /// internal pipeline stages, not external input.
    pub fn map_columns_of(like: &Panel, mut f: impl FnMut(usize, &[f64]) -> Vec<f64>) -> Self {
        let n = like.n_dates();
        let mut values = Vec::with_capacity(like.values.len());
        for a in 0..like.n_assets() {
            let col = f(a, like.column(a));
            assert_eq!(col.len(), n, "column producer returned wrong length");
            values.extend(col);
        }
        Self {
            dates: like.dates.clone(),
            assets: like.assets.clone(),
            values,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// Position of an asset on the column axis, if present.
    pub fn asset_index(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// One asset's full history as a contiguous slice.
    pub fn column(&self, asset_idx: usize) -> &[f64] {
        let n = self.n_dates();
        &self.values[asset_idx * n..(asset_idx + 1) * n]
    }

    pub fn get(&self, date_idx: usize, asset_idx: usize) -> f64 {
        self.values[asset_idx * self.n_dates() + date_idx]
    }

    /// Per-column percent change; the first date has no prior observation
    /// and is defined as 0.0 (see backtest lag semantics).
    pub fn pct_change(&self) -> Panel {
        Panel::map_columns_of(self, |_, col| {
            let mut out = vec![0.0; col.len()];
            for t in 1..col.len() {
                out[t] = (col[t] - col[t - 1]) / col[t - 1];
            }
            out
        })
    }

    /// True when any cell is non-finite.
    pub fn has_non_finite(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }
}

/// The three price fields of the input panel, sharing one date axis and
/// one asset list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePanel {
    pub last: Panel,
    pub high: Panel,
    pub low: Panel,
}

impl PricePanel {
    /// Assemble the field panels, rejecting any axis disagreement.
    pub fn new(last: Panel, high: Panel, low: Panel) -> Result<Self, DataIntegrityError> {
        for (field, panel) in [("high", &high), ("low", &low)] {
            if panel.dates != last.dates {
                return Err(DataIntegrityError::FieldAxisMismatch {
                    field: field.to_string(),
                    axis: "date".to_string(),
                });
            }
            if panel.assets != last.assets {
                return Err(DataIntegrityError::FieldAxisMismatch {
                    field: field.to_string(),
                    axis: "asset".to_string(),
                });
            }
        }
        Ok(Self { last, high, low })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.last.dates()
    }

    pub fn assets(&self) -> &[String] {
        self.last.assets()
    }
}

fn validate_dates(dates: &[NaiveDate]) -> Result<(), DataIntegrityError> {
    if dates.is_empty() {
        return Err(DataIntegrityError::EmptyDates);
    }
    for (i, pair) in dates.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(DataIntegrityError::NonMonotonicDates {
                position: i + 1,
                prev: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}
