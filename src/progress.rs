use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::{Result, TrackerError},
    ledger::DEFAULT_DAILY_TARGET_LITERS,
    store::{keys, read_decimal, KeyValueStore},
};

/// Derived progress toward the daily target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub logged_liters: f64,
    pub target_liters: f64,
    /// `logged / target`, unclamped.
    pub fraction_complete: f64,
    /// `target - logged`, raw signed value; negative only if invariants were
    /// violated elsewhere.
    pub remaining_liters: f64,
}

impl Progress {
    /// Whole-number percent for display.
    pub fn percent_display(&self) -> i64 {
        (self.fraction_complete * 100.0).round() as i64
    }

    /// Remaining amount with negative values shown as zero.
    pub fn remaining_for_display(&self) -> f64 {
        self.remaining_liters.max(0.0)
    }
}

/// Pure derivation; no side effects, no persistence. A zero target is an
/// invalid state the caller must prevent upstream and fails here.
pub fn compute_progress(logged_liters: f64, target_liters: f64) -> Result<Progress> {
    if target_liters == 0.0 {
        return Err(TrackerError::ZeroTarget);
    }

    Ok(Progress {
        logged_liters,
        target_liters,
        fraction_complete: logged_liters / target_liters,
        remaining_liters: target_liters - logged_liters,
    })
}

/// Read-side view model: pulls the counter and target from the store and
/// derives progress. Never touches the ledger itself.
#[derive(Clone)]
pub struct ProgressModel {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressModel {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn current(&self) -> Result<Progress> {
        let logged = read_decimal(self.store.as_ref(), keys::LOGGED_AMOUNT)
            .await?
            .unwrap_or(0.0);
        let target = read_decimal(self.store.as_ref(), keys::INDIVIDUAL_NEED)
            .await?
            .unwrap_or(DEFAULT_DAILY_TARGET_LITERS);
        compute_progress(logged, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halfway_there() {
        let progress = compute_progress(1.25, 2.5).unwrap();
        assert_eq!(progress.fraction_complete, 0.5);
        assert_eq!(progress.remaining_liters, 1.25);
        assert_eq!(progress.percent_display(), 50);
    }

    #[test]
    fn zero_target_is_an_error() {
        assert_eq!(compute_progress(1.0, 0.0).unwrap_err(), TrackerError::ZeroTarget);
    }

    #[test]
    fn remaining_is_raw_but_display_clamps() {
        let progress = compute_progress(3.0, 2.5).unwrap();
        assert_eq!(progress.remaining_liters, -0.5);
        assert_eq!(progress.remaining_for_display(), 0.0);
    }

    #[test]
    fn nothing_logged_yet() {
        let progress = compute_progress(0.0, 2.0).unwrap();
        assert_eq!(progress.fraction_complete, 0.0);
        assert_eq!(progress.remaining_liters, 2.0);
    }
}
