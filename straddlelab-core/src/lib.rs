//! StraddleLab Core — panel domain types and the signal/weight pipeline.
//!
//! This crate contains the heart of the strategy engine:
//! - Date-by-asset panel types with strict integrity validation
//! - Lookback-straddle momentum score (vectorized Black-Scholes deltas)
//! - Smoothed true-range volatility estimator
//! - Composite signal state machine (trend entries, breakout exits)
//! - Risk-parity position sizing into currency weights
//!
//! Every stage is a pure function: panels in, a new panel out. Panels are
//! produced once and never mutated after publication, so downstream
//! consumers may read them from parallel workers without locking.

pub mod domain;
pub mod indicators;
pub mod signals;
pub mod weights;
