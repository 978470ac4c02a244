//! Controller error types
//!
//! None of these are fatal to the controller itself: every compensation cycle
//! is independent and the controller stays armed for the next poll.

/// Errors raised during a compensation cycle
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompensationError {
    /// A required device is disconnected or unavailable
    #[error("{device} not connected")]
    NotConnected { device: &'static str },

    /// The focuser reported a non-finite temperature
    #[error("invalid temperature reading: {0}")]
    InvalidReading(f64),

    /// Computed position or step count is outside the actuator's i32 range
    #[error("computed focuser command {exact:.1} is outside the actuator range")]
    OutOfRange { exact: f64 },

    /// The cycle was cancelled via the cancellation token
    #[error("compensation cycle cancelled")]
    Cancelled,

    /// A device operation failed
    #[error("device operation failed: {0}")]
    Device(String),
}
