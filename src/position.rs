//! Position calculation
//!
//! Computes the next integer focuser command from the linear thermal model,
//! carrying the fractional remainder of each rounded command forward into the
//! next cycle so repeated small corrections do not drift systematically.
//!
//! Rounding is half-away-from-zero (`f64::round`), never banker's rounding;
//! the remainder-carry identity `command + remainder == exact` depends on it.

use crate::config::CompensationConfig;
use crate::error::CompensationError;
use crate::state::ControlState;

/// Outcome of a position calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    /// Drive the focuser to this absolute position
    MoveAbsolute(i32),
    /// Move the focuser by this many steps
    MoveRelative(i32),
    /// The model is already satisfied; no physical move required
    NoMove,
}

/// Compute the next move for the active mode.
///
/// `last_temperature` is the accepted baseline; callers must not invoke this
/// while the baseline is unset. On [`CompensationError::OutOfRange`] the
/// remainder accumulators are left untouched.
pub fn compute_move(
    config: &CompensationConfig,
    current_temp: f64,
    current_position: Option<i32>,
    last_temperature: f64,
    state: &mut ControlState,
) -> Result<MoveDecision, CompensationError> {
    if config.absolute {
        compute_absolute_move(config.slope, config.intercept, current_temp, current_position, state)
    } else {
        compute_relative_move(config.slope, current_temp, last_temperature, state)
    }
}

/// Absolute mode: `position = slope * T + intercept`, plus carried remainder.
///
/// If the focuser already reports the rounded target, signals [`MoveDecision::NoMove`];
/// the remainder update still applies in that case.
pub fn compute_absolute_move(
    slope: f64,
    intercept: f64,
    current_temp: f64,
    current_position: Option<i32>,
    state: &mut ControlState,
) -> Result<MoveDecision, CompensationError> {
    let exact = current_temp * slope + intercept + state.absolute_remainder;
    check_actuator_range(exact)?;

    let target = exact.round() as i32;
    state.absolute_remainder = exact - target as f64;

    if current_position == Some(target) {
        tracing::debug!("Focuser already at computed target {}, no move needed", target);
        return Ok(MoveDecision::NoMove);
    }
    Ok(MoveDecision::MoveAbsolute(target))
}

/// Relative mode: `steps = slope * (T - baseline)`, plus carried remainder.
///
/// Signals [`MoveDecision::NoMove`] when the rounded step count is zero; the
/// orchestrator still advances the baseline in that case so the same
/// sub-step drift does not keep re-arming the trigger.
pub fn compute_relative_move(
    slope: f64,
    current_temp: f64,
    last_temperature: f64,
    state: &mut ControlState,
) -> Result<MoveDecision, CompensationError> {
    let exact = (current_temp - last_temperature) * slope + state.relative_remainder;
    check_actuator_range(exact)?;

    let steps = exact.round() as i32;
    state.relative_remainder = exact - steps as f64;

    if steps == 0 {
        return Ok(MoveDecision::NoMove);
    }
    Ok(MoveDecision::MoveRelative(steps))
}

fn check_actuator_range(exact: f64) -> Result<(), CompensationError> {
    // Also rejects NaN from a degenerate model
    if !(exact >= i32::MIN as f64 && exact <= i32::MAX as f64) {
        return Err(CompensationError::OutOfRange { exact });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_remainder_identity() {
        // command + new remainder must reconstruct the exact model position
        let cases = [
            (1.0, 100.0, 25.3, 0.0),
            (-20.0, 24000.0, 12.7, 0.15),
            (2.5, 0.0, -4.2, -0.33),
        ];
        for (slope, intercept, temp, carry) in cases {
            let mut state = ControlState {
                absolute_remainder: carry,
                ..Default::default()
            };
            let exact = temp * slope + intercept + carry;
            let decision = compute_absolute_move(slope, intercept, temp, None, &mut state).unwrap();
            let target = match decision {
                MoveDecision::MoveAbsolute(p) => p,
                other => panic!("unexpected decision: {:?}", other),
            };
            assert_eq!(target as f64 + state.absolute_remainder, exact);
            assert!(state.absolute_remainder.abs() <= 0.5);
        }
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        // slope 1, intercept 0: exact position equals temperature
        let mut state = ControlState::default();
        let d = compute_absolute_move(1.0, 0.0, 0.5, None, &mut state).unwrap();
        assert_eq!(d, MoveDecision::MoveAbsolute(1));
        assert_eq!(state.absolute_remainder, -0.5);

        let mut state = ControlState::default();
        let d = compute_absolute_move(1.0, 0.0, -0.5, None, &mut state).unwrap();
        assert_eq!(d, MoveDecision::MoveAbsolute(-1));
        assert_eq!(state.absolute_remainder, 0.5);

        // banker's rounding would give 2 here; half-away-from-zero gives 3
        let mut state = ControlState::default();
        let d = compute_absolute_move(1.0, 0.0, 2.5, None, &mut state).unwrap();
        assert_eq!(d, MoveDecision::MoveAbsolute(3));
    }

    #[test]
    fn test_relative_half_step_rounds_away_from_zero() {
        let mut state = ControlState::default();
        // delta 0.5 °C at 1 step/°C: exactly half a step
        let d = compute_relative_move(1.0, 10.5, 10.0, &mut state).unwrap();
        assert_eq!(d, MoveDecision::MoveRelative(1));
        assert_eq!(state.relative_remainder, -0.5);

        let mut state = ControlState::default();
        let d = compute_relative_move(1.0, 9.5, 10.0, &mut state).unwrap();
        assert_eq!(d, MoveDecision::MoveRelative(-1));
        assert_eq!(state.relative_remainder, 0.5);
    }

    #[test]
    fn test_absolute_no_move_when_already_at_target() {
        let mut state = ControlState::default();
        // 25.3 * 1.0 + 100 = 125.3 -> target 125, remainder 0.3
        let d = compute_absolute_move(1.0, 100.0, 25.3, Some(125), &mut state).unwrap();
        assert_eq!(d, MoveDecision::NoMove);
        // remainder update still applies on the no-move path
        assert!((state.absolute_remainder - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_absolute_moves_when_position_unobtainable() {
        let mut state = ControlState::default();
        let d = compute_absolute_move(1.0, 100.0, 25.3, None, &mut state).unwrap();
        assert_eq!(d, MoveDecision::MoveAbsolute(125));
    }

    #[test]
    fn test_relative_zero_steps_is_no_move() {
        let mut state = ControlState::default();
        // 0.2 °C at 2 steps/°C = 0.4 steps -> rounds to 0
        let d = compute_relative_move(2.0, 10.2, 10.0, &mut state).unwrap();
        assert_eq!(d, MoveDecision::NoMove);
        assert!((state.relative_remainder - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_relative_carry_accumulates_across_cycles() {
        let mut state = ControlState::default();
        assert_eq!(
            compute_relative_move(2.0, 10.2, 10.0, &mut state).unwrap(),
            MoveDecision::NoMove
        );
        // next cycle: 0.4 steps of drift plus the 0.4 carried = 0.8 -> 1 step
        let d = compute_relative_move(2.0, 10.4, 10.2, &mut state).unwrap();
        assert_eq!(d, MoveDecision::MoveRelative(1));
        assert!((state.relative_remainder - (-0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_leaves_remainder_untouched() {
        let mut state = ControlState {
            absolute_remainder: 0.25,
            relative_remainder: -0.1,
            ..Default::default()
        };
        let err = compute_absolute_move(1e9, 0.0, 100.0, None, &mut state).unwrap_err();
        assert!(matches!(err, CompensationError::OutOfRange { .. }));
        assert_eq!(state.absolute_remainder, 0.25);

        let err = compute_relative_move(1e9, 110.0, 10.0, &mut state).unwrap_err();
        assert!(matches!(err, CompensationError::OutOfRange { .. }));
        assert_eq!(state.relative_remainder, -0.1);
    }

    #[test]
    fn test_calculation_is_idempotent_over_fixed_state() {
        let config = CompensationConfig::new(0.5, true, 1.5, 20000.0);
        let mut first = ControlState::default();
        let mut second = ControlState::default();
        let a = compute_move(&config, 12.34, Some(5000), 12.0, &mut first).unwrap();
        let b = compute_move(&config, 12.34, Some(5000), 12.0, &mut second).unwrap();
        assert_eq!(a, b);
        assert_eq!(first.absolute_remainder, second.absolute_remainder);
    }

    #[test]
    fn test_mode_selection_uses_matching_accumulator() {
        let mut state = ControlState {
            absolute_remainder: 0.4,
            relative_remainder: 0.4,
            ..Default::default()
        };
        let relative = CompensationConfig::new(0.5, false, 2.0, 0.0);
        compute_move(&relative, 10.6, None, 10.0, &mut state).unwrap();
        // relative carry changed, absolute carry untouched
        assert_eq!(state.absolute_remainder, 0.4);
        assert!((state.relative_remainder - (-0.4)).abs() < 1e-9);
    }
}
