//! Signal computation — momentum score, discretization, composite state.
//!
//! `straddle` turns price windows into a continuous momentum score via
//! option-delta mathematics; `composite` runs the per-asset state machine
//! that converts the score into a persistent directional signal.

pub mod composite;
pub mod straddle;

pub use composite::composite_signal;
pub use straddle::{discretize, straddle_deltas, StraddleDeltaEngine, SignalError};
