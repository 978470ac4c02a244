//! Temperature-driven focus compensation
//!
//! Watches a focuser's temperature sensor during an imaging session and moves
//! the focuser along a linear thermal model when the cumulative drift since
//! the last accepted reading exceeds a configured threshold. Guiding is
//! paused for the duration of the physical move and always resumed afterward,
//! even if the move fails partway.
//!
//! The host sequencer drives the controller: it polls [`Compensator::poll`]
//! (or checks [`trigger::should_trigger`] and calls [`Compensator::execute`]
//! itself) once per cycle. The controller never schedules its own polling.

pub mod config;
pub mod controller;
pub mod device_ops;
pub mod error;
pub mod monitor;
pub mod position;
pub mod state;
pub mod trigger;
pub mod validation;

pub use config::{CompensationConfig, CompensationMode};
pub use controller::{Compensator, CycleOutcome};
pub use device_ops::{
    DeviceOps, DeviceResult, FocuserInfo, GuiderInfo, NullDeviceOps, SharedDeviceOps,
};
pub use error::CompensationError;
pub use position::MoveDecision;
pub use state::ControlState;
pub use validation::{ValidationReport, ValidationUnit};
