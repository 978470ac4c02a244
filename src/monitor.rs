//! Polling loop helper
//!
//! A thin scheduler for hosts that do not have their own: polls the
//! compensator at a fixed interval until the cancellation token is set.
//! Cycle errors are logged and the loop keeps running; every cycle is
//! independent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::controller::Compensator;
use crate::device_ops::SharedDeviceOps;
use crate::error::CompensationError;

pub async fn run_compensation_loop(
    compensator: &mut Compensator,
    ops: SharedDeviceOps,
    interval: Duration,
    cancel: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!("Compensation loop cancelled");
            break;
        }

        match compensator.poll(ops.as_ref(), &cancel).await {
            Ok(Some(outcome)) => {
                tracing::info!("Compensation cycle completed: {:?}", outcome);
            }
            Ok(None) => {}
            Err(CompensationError::Cancelled) => {
                tracing::debug!("Compensation loop cancelled mid-cycle");
                break;
            }
            Err(e) => {
                // already notified; stay armed for the next poll
                tracing::warn!("Compensation cycle failed: {}", e);
            }
        }
    }
}
