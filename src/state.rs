//! Runtime control state
//!
//! Never persisted; reinitialized each time the controller is activated.

use chrono::{DateTime, Utc};

/// Mutable state shared by the trigger evaluator, position calculator and
/// move orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    /// Baseline reading from the previous accepted cycle. `None` until the
    /// first valid sample is seen; no move is ever attempted while unset.
    pub last_temperature: Option<f64>,

    /// Fractional carry from the last rounded absolute-mode target
    pub absolute_remainder: f64,

    /// Fractional carry from the last rounded relative-mode step count.
    /// Kept separate from the absolute accumulator so switching modes does
    /// not corrupt the other's carry.
    pub relative_remainder: f64,

    /// Diagnostic counter of cycles that reached the move phase
    pub cycle_count: u32,

    /// Timestamp of the most recent applied move
    pub last_run: Option<DateTime<Utc>>,
}

impl ControlState {
    /// Clear all runtime state, as on controller activation
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
