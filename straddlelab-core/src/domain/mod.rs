//! Domain types — panels, rate series, and per-asset configuration.

pub mod asset;
pub mod panel;
pub mod rates;

pub use asset::{coverage_start, AssetConfig, ConfigurationError, Universe};
pub use panel::{DataIntegrityError, Panel, PricePanel};
pub use rates::RateSeries;
