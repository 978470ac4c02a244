//! Compensation configuration
//!
//! User-set parameters of the linear thermal model. Persistence is handled by
//! the host application; this crate only defines the serializable shape.

use serde::{Deserialize, Deserializer, Serialize};

/// Compensation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompensationMode {
    /// Drive the focuser to an absolute position computed from temperature
    Absolute,
    /// Apply a relative step computed from the temperature change since baseline
    Relative,
}

impl Default for CompensationMode {
    fn default() -> Self {
        Self::Relative
    }
}

/// Configuration for temperature compensation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationConfig {
    /// Minimum absolute temperature change (°C) required to arm a cycle.
    /// Always stored rounded to one decimal place.
    #[serde(
        default = "default_temperature_delta",
        deserialize_with = "deserialize_rounded_delta"
    )]
    temperature_delta: f64,

    /// True drives to an absolute position, false applies a relative step
    #[serde(default)]
    pub absolute: bool,

    /// Thermal slope in steps per degree Celsius.
    /// Absolute mode: position = slope * T + intercept.
    /// Relative mode: steps = slope * delta-T.
    /// Typical values: -5 to -50 steps/°C for most systems.
    #[serde(default = "default_slope")]
    pub slope: f64,

    /// Position intercept of the linear model; only meaningful in absolute mode
    #[serde(default)]
    pub intercept: f64,
}

impl Default for CompensationConfig {
    fn default() -> Self {
        Self {
            temperature_delta: default_temperature_delta(),
            absolute: false,
            slope: default_slope(),
            intercept: 0.0,
        }
    }
}

impl CompensationConfig {
    pub fn new(temperature_delta: f64, absolute: bool, slope: f64, intercept: f64) -> Self {
        Self {
            temperature_delta: round_to_one_decimal(temperature_delta),
            absolute,
            slope,
            intercept,
        }
    }

    /// Trigger threshold in °C, rounded to one decimal place
    pub fn temperature_delta(&self) -> f64 {
        self.temperature_delta
    }

    pub fn set_temperature_delta(&mut self, delta: f64) {
        self.temperature_delta = round_to_one_decimal(delta);
    }

    /// Active mode derived from the persisted `absolute` flag
    pub fn mode(&self) -> CompensationMode {
        if self.absolute {
            CompensationMode::Absolute
        } else {
            CompensationMode::Relative
        }
    }
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn deserialize_rounded_delta<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(round_to_one_decimal(value))
}

fn default_temperature_delta() -> f64 {
    1.0
}

fn default_slope() -> f64 {
    -20.0
}
