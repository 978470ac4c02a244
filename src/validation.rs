//! Precondition validation
//!
//! Independently checks equipment connectivity and model sanity and reports
//! issues without blocking the trigger or the orchestrator. The host polls
//! this to surface configuration problems in its UI.

use crate::config::CompensationConfig;
use crate::device_ops::DeviceOps;

/// Snapshot of the current validation issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True iff no issues were found
    pub ok: bool,
    /// Human-readable issues, in a stable order
    pub issues: Vec<String>,
    /// True iff the issue list differs from the previous call, so observers
    /// can skip redundant change notifications
    pub changed: bool,
}

/// Recomputes issues on demand and tracks the last-emitted snapshot
#[derive(Debug, Default)]
pub struct ValidationUnit {
    last_issues: Vec<String>,
}

impl ValidationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute issues from current connectivity and model state.
    ///
    /// Change detection is order-sensitive sequence equality against the
    /// previous snapshot.
    pub async fn validate(
        &mut self,
        ops: &dyn DeviceOps,
        config: &CompensationConfig,
    ) -> ValidationReport {
        let mut issues = Vec::new();

        match ops.focuser_get_info().await {
            Ok(info) if info.connected => {}
            _ => issues.push("Focuser not connected".to_string()),
        }
        match ops.guider_get_info().await {
            Ok(info) if info.connected => {}
            _ => issues.push("Guider not connected".to_string()),
        }
        if config.slope == 0.0 {
            issues.push("Slope is zero; compensation will never move the focuser".to_string());
        }

        let changed = issues != self.last_issues;
        self.last_issues = issues.clone();

        ValidationReport {
            ok: issues.is_empty(),
            issues,
            changed,
        }
    }
}
