//! Device Operations Trait
//!
//! This module defines the interface for the device operations the
//! compensation controller needs. The actual implementation is provided by
//! the host application's device bridge.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

/// Result type for device operations
pub type DeviceResult<T> = Result<T, String>;

/// Focuser snapshot returned by [`DeviceOps::focuser_get_info`]
#[derive(Debug, Clone, Copy)]
pub struct FocuserInfo {
    pub connected: bool,
    /// Raw instantaneous sensor reading in °C; may be non-finite if the
    /// focuser has no working temperature probe
    pub temperature: f64,
    /// Current reported position, when the focuser exposes one
    pub position: Option<i32>,
}

/// Guider snapshot returned by [`DeviceOps::guider_get_info`]
#[derive(Debug, Clone, Copy)]
pub struct GuiderInfo {
    pub connected: bool,
}

/// Trait defining the device operations needed by the compensation controller
///
/// Implemented by the host bridge for real hardware (ASCOM/Alpaca/INDI) or by
/// a simulator. The controller calls these methods without knowing the
/// implementation details.
#[async_trait]
pub trait DeviceOps: Send + Sync {
    /// Get focuser connectivity, temperature and position
    async fn focuser_get_info(&self) -> DeviceResult<FocuserInfo>;

    /// Move focuser to an absolute position
    async fn focuser_move_absolute(&self, position: i32) -> DeviceResult<()>;

    /// Move focuser by a relative step count (sign selects direction)
    async fn focuser_move_relative(&self, steps: i32) -> DeviceResult<()>;

    /// Get guider connectivity
    async fn guider_get_info(&self) -> DeviceResult<GuiderInfo>;

    /// Stop guiding ahead of a focuser move
    async fn guider_stop(&self) -> DeviceResult<()>;

    /// Resume guiding. `force_calibration` is always false for compensation
    /// resumes; the guider picks its own exposure reference.
    async fn guider_start(&self, force_calibration: bool) -> DeviceResult<()>;

    /// Send a user-visible notification
    async fn send_notification(&self, level: &str, title: &str, message: &str) -> DeviceResult<()>;
}

/// Shared device operations handle
pub type SharedDeviceOps = Arc<dyn DeviceOps>;

/// A null implementation for testing without real devices
pub struct NullDeviceOps {
    position: AtomicI32,
    temperature: Mutex<f64>,
    guiding: AtomicBool,
}

impl NullDeviceOps {
    pub fn new() -> Self {
        Self {
            position: AtomicI32::new(25000),
            temperature: Mutex::new(15.0),
            guiding: AtomicBool::new(true),
        }
    }

    /// Set the simulated sensor temperature
    pub fn set_temperature(&self, temperature: f64) {
        *self.temperature.lock().unwrap() = temperature;
    }

    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn is_guiding(&self) -> bool {
        self.guiding.load(Ordering::Relaxed)
    }
}

impl Default for NullDeviceOps {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceOps for NullDeviceOps {
    async fn focuser_get_info(&self) -> DeviceResult<FocuserInfo> {
        Ok(FocuserInfo {
            connected: true,
            temperature: *self.temperature.lock().unwrap(),
            position: Some(self.position.load(Ordering::Relaxed)),
        })
    }

    async fn focuser_move_absolute(&self, position: i32) -> DeviceResult<()> {
        tracing::info!("[NULL] Moving focuser to {}", position);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        self.position.store(position, Ordering::Relaxed);
        Ok(())
    }

    async fn focuser_move_relative(&self, steps: i32) -> DeviceResult<()> {
        tracing::info!("[NULL] Moving focuser by {:+} steps", steps);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        self.position.fetch_add(steps, Ordering::Relaxed);
        Ok(())
    }

    async fn guider_get_info(&self) -> DeviceResult<GuiderInfo> {
        Ok(GuiderInfo { connected: true })
    }

    async fn guider_stop(&self) -> DeviceResult<()> {
        tracing::info!("[NULL] Stopping guiding");
        self.guiding.store(false, Ordering::Relaxed);
        Ok(())
    }

    async fn guider_start(&self, force_calibration: bool) -> DeviceResult<()> {
        tracing::info!("[NULL] Starting guiding (force_calibration={})", force_calibration);
        self.guiding.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn send_notification(&self, level: &str, title: &str, message: &str) -> DeviceResult<()> {
        tracing::info!("[NOTIFICATION][{}] {}: {}", level, title, message);
        Ok(())
    }
}
