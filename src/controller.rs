//! Move orchestration
//!
//! Runs one guarded compensation cycle: re-validate devices, compute the
//! move, pause guiding, apply the move, and resume guiding on every exit
//! path. A telescope must never be left with guiding disabled because the
//! focuser faulted mid-move.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::CompensationConfig;
use crate::device_ops::DeviceOps;
use crate::error::CompensationError;
use crate::position::{compute_move, MoveDecision};
use crate::state::ControlState;
use crate::trigger::should_trigger;

const NOTIFICATION_TITLE: &str = "Temperature compensation";

/// Outcome of a completed compensation cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// First valid reading seen; baseline recorded, nothing moved
    BaselineEstablished(f64),
    /// The model is already satisfied at the current temperature
    NoMoveNeeded,
    /// A focuser move was applied
    Applied {
        command: MoveDecision,
        temperature: f64,
    },
}

/// Temperature compensation controller.
///
/// The host sequencer serializes calls; the controller assumes no two cycles
/// overlap. Each poll is independent: an error aborts the current cycle and
/// leaves the controller armed for the next one.
pub struct Compensator {
    config: CompensationConfig,
    state: ControlState,
}

impl Compensator {
    pub fn new(config: CompensationConfig) -> Self {
        Self {
            config,
            state: ControlState::default(),
        }
    }

    pub fn config(&self) -> &CompensationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CompensationConfig {
        &mut self.config
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Clear runtime state, as on sequence activation
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// One scheduler cycle: evaluate the trigger and execute when armed.
    ///
    /// Returns `Ok(None)` when the trigger did not fire.
    pub async fn poll(
        &mut self,
        ops: &dyn DeviceOps,
        cancel: &Arc<AtomicBool>,
    ) -> Result<Option<CycleOutcome>, CompensationError> {
        let focuser = ops.focuser_get_info().await.map_err(CompensationError::Device)?;
        let guider = ops.guider_get_info().await.map_err(CompensationError::Device)?;

        if !should_trigger(
            focuser.connected,
            guider.connected,
            focuser.temperature,
            self.config.temperature_delta(),
            &mut self.state,
        ) {
            return Ok(None);
        }
        self.execute(ops, cancel).await.map(Some)
    }

    /// Run one compensation cycle.
    ///
    /// Expected to be called after the trigger fired, but revalidates
    /// connectivity and the temperature reading itself: device state can
    /// change between the poll and the move.
    pub async fn execute(
        &mut self,
        ops: &dyn DeviceOps,
        cancel: &Arc<AtomicBool>,
    ) -> Result<CycleOutcome, CompensationError> {
        let focuser = ops.focuser_get_info().await.map_err(CompensationError::Device)?;
        if !focuser.connected {
            return self.fail(ops, CompensationError::NotConnected { device: "focuser" }).await;
        }
        let guider = ops.guider_get_info().await.map_err(CompensationError::Device)?;
        if !guider.connected {
            return self.fail(ops, CompensationError::NotConnected { device: "guider" }).await;
        }

        let current_temp = focuser.temperature;
        if !current_temp.is_finite() {
            return self.fail(ops, CompensationError::InvalidReading(current_temp)).await;
        }

        // Defensive double-guard: the trigger normally initializes the
        // baseline, but execute() can be called directly.
        let last_temperature = match self.state.last_temperature {
            Some(t) => t,
            None => {
                tracing::info!("Establishing temperature baseline: {:.2}°C", current_temp);
                self.state.last_temperature = Some(current_temp);
                return Ok(CycleOutcome::BaselineEstablished(current_temp));
            }
        };

        let decision = match compute_move(
            &self.config,
            current_temp,
            focuser.position,
            last_temperature,
            &mut self.state,
        ) {
            Ok(d) => d,
            Err(e) => return self.fail(ops, e).await,
        };

        if decision == MoveDecision::NoMove {
            if !self.config.absolute {
                // Advance the baseline so the same sub-step drift does not
                // keep re-arming the trigger every poll.
                self.state.last_temperature = Some(current_temp);
            }
            tracing::debug!(
                "No compensation move needed at {:.2}°C (baseline {:.2}°C)",
                current_temp,
                last_temperature
            );
            return Ok(CycleOutcome::NoMoveNeeded);
        }

        self.apply_move(ops, cancel, decision, current_temp).await
    }

    /// Pause guiding, apply the move, resume guiding.
    ///
    /// Resume runs on every exit path once guiding was paused, including
    /// cancellation and focuser faults; the fault still propagates to the
    /// caller afterward. The cycle counter increments whenever this phase
    /// was entered.
    async fn apply_move(
        &mut self,
        ops: &dyn DeviceOps,
        cancel: &Arc<AtomicBool>,
        decision: MoveDecision,
        current_temp: f64,
    ) -> Result<CycleOutcome, CompensationError> {
        let mut guiding_paused = false;
        let result = self
            .guarded_move(ops, cancel, decision, current_temp, &mut guiding_paused)
            .await;

        // Exit path, taken for success, error and cancellation alike
        if guiding_paused {
            // Resume without dithering or an explicit exposure reference
            if let Err(e) = ops.guider_start(false).await {
                tracing::warn!("Failed to resume guiding after focuser move: {}", e);
            }
        }
        self.state.cycle_count += 1;

        match result {
            Ok(()) => {
                let message = match decision {
                    MoveDecision::MoveAbsolute(position) => format!(
                        "Moved focuser to {} at {:.2}°C",
                        position, current_temp
                    ),
                    MoveDecision::MoveRelative(steps) => format!(
                        "Moved focuser {:+} steps at {:.2}°C",
                        steps, current_temp
                    ),
                    MoveDecision::NoMove => unreachable!("no-move decisions never reach apply_move"),
                };
                tracing::info!("{}", message);
                if let Err(e) = ops.send_notification("info", NOTIFICATION_TITLE, &message).await {
                    tracing::warn!("Failed to send notification: {}", e);
                }
                Ok(CycleOutcome::Applied {
                    command: decision,
                    temperature: current_temp,
                })
            }
            Err(CompensationError::Cancelled) => {
                tracing::warn!("Temperature compensation cancelled");
                Err(CompensationError::Cancelled)
            }
            Err(e) => self.fail(ops, e).await,
        }
    }

    async fn guarded_move(
        &mut self,
        ops: &dyn DeviceOps,
        cancel: &Arc<AtomicBool>,
        decision: MoveDecision,
        current_temp: f64,
        guiding_paused: &mut bool,
    ) -> Result<(), CompensationError> {
        check_cancelled(cancel)?;

        ops.guider_stop().await.map_err(CompensationError::Device)?;
        *guiding_paused = true;

        check_cancelled(cancel)?;

        match decision {
            MoveDecision::MoveAbsolute(position) => ops
                .focuser_move_absolute(position)
                .await
                .map_err(CompensationError::Device)?,
            MoveDecision::MoveRelative(steps) => ops
                .focuser_move_relative(steps)
                .await
                .map_err(CompensationError::Device)?,
            MoveDecision::NoMove => {}
        }

        self.state.last_temperature = Some(current_temp);
        self.state.last_run = Some(chrono::Utc::now());
        Ok(())
    }

    /// Report a cycle failure and abort. The controller stays armed.
    async fn fail(
        &self,
        ops: &dyn DeviceOps,
        error: CompensationError,
    ) -> Result<CycleOutcome, CompensationError> {
        tracing::error!("Temperature compensation failed: {}", error);
        if let Err(e) = ops
            .send_notification("error", NOTIFICATION_TITLE, &error.to_string())
            .await
        {
            tracing::warn!("Failed to send notification: {}", e);
        }
        Err(error)
    }
}

fn check_cancelled(cancel: &Arc<AtomicBool>) -> Result<(), CompensationError> {
    if cancel.load(Ordering::Relaxed) {
        Err(CompensationError::Cancelled)
    } else {
        Ok(())
    }
}
