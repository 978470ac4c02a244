//! Trigger evaluation
//!
//! Decides each poll whether cumulative temperature drift warrants running a
//! compensation cycle. Polling itself is the host sequencer's job.

use crate::state::ControlState;

/// Evaluate the compensation trigger for the current poll.
///
/// The only side effect is baseline initialization: the first finite reading
/// becomes the baseline and the trigger never fires on that sample. After
/// that, fires iff both devices are connected, the reading is finite, the
/// threshold is set (> 0) and the drift since baseline meets it.
pub fn should_trigger(
    focuser_connected: bool,
    guider_connected: bool,
    current_temp: f64,
    delta_threshold: f64,
    state: &mut ControlState,
) -> bool {
    if !focuser_connected || !guider_connected {
        return false;
    }
    if !current_temp.is_finite() {
        return false;
    }

    let last = match state.last_temperature {
        Some(t) => t,
        None => {
            tracing::debug!("Establishing temperature baseline: {:.2}°C", current_temp);
            state.last_temperature = Some(current_temp);
            return false;
        }
    };

    if !delta_threshold.is_finite() || delta_threshold <= 0.0 {
        return false;
    }

    (current_temp - last).abs() >= delta_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_trigger_when_disconnected() {
        let mut state = ControlState {
            last_temperature: Some(10.0),
            ..Default::default()
        };
        assert!(!should_trigger(false, true, 20.0, 0.5, &mut state));
        assert!(!should_trigger(true, false, 20.0, 0.5, &mut state));
    }

    #[test]
    fn test_no_trigger_on_non_finite_reading() {
        let mut state = ControlState::default();
        assert!(!should_trigger(true, true, f64::NAN, 0.5, &mut state));
        assert!(!should_trigger(true, true, f64::INFINITY, 0.5, &mut state));
        // a bad reading must not initialize the baseline
        assert!(state.last_temperature.is_none());
    }

    #[test]
    fn test_first_sample_initializes_baseline_without_firing() {
        let mut state = ControlState::default();
        assert!(!should_trigger(true, true, 10.0, 0.5, &mut state));
        assert_eq!(state.last_temperature, Some(10.0));
    }

    #[test]
    fn test_no_trigger_with_unset_threshold() {
        let mut state = ControlState {
            last_temperature: Some(10.0),
            ..Default::default()
        };
        assert!(!should_trigger(true, true, 20.0, 0.0, &mut state));
        assert!(!should_trigger(true, true, 20.0, -1.0, &mut state));
        assert!(!should_trigger(true, true, 20.0, f64::NAN, &mut state));
    }

    #[test]
    fn test_threshold_comparison_is_inclusive() {
        let mut state = ControlState {
            last_temperature: Some(10.0),
            ..Default::default()
        };
        assert!(!should_trigger(true, true, 10.3, 0.5, &mut state));
        assert!(should_trigger(true, true, 10.5, 0.5, &mut state));
        // drift in either direction counts
        assert!(should_trigger(true, true, 9.4, 0.5, &mut state));
    }

    #[test]
    fn test_trigger_does_not_advance_baseline() {
        let mut state = ControlState {
            last_temperature: Some(10.0),
            ..Default::default()
        };
        assert!(should_trigger(true, true, 11.0, 0.5, &mut state));
        // the orchestrator advances the baseline, not the trigger
        assert_eq!(state.last_temperature, Some(10.0));
    }
}
