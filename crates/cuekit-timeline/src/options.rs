//! Per-item construction options.

use serde::{Deserialize, Serialize};

/// Options applied when a raw record is turned into a [`DetectionItem`].
///
/// Drift thresholds decide when two consecutive detections stop belonging to
/// the same run. Non-positive or non-finite values fall back to the defaults.
///
/// [`DetectionItem`]: crate::DetectionItem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOptions {
    /// Maximum gap in milliseconds between a run's last end and the next begin (default: 1200).
    pub time_drift_threshold_ms: f64,
    /// Maximum center displacement in normalized frame units (default: 0.10).
    pub position_drift_threshold: f64,
    /// Replaces the detector's name for moderation labels.
    pub name_override: Option<String>,
}

impl ItemOptions {
    pub const DEFAULT_TIME_DRIFT_MS: f64 = 1200.0;
    pub const DEFAULT_POSITION_DRIFT: f64 = 0.10;

    /// Options for a detector that sampled frames every `sampling_ms`:
    /// the time threshold allows a 20% jitter over the sampling interval.
    pub fn from_sampling_ms(sampling_ms: u64) -> Self {
        Self {
            time_drift_threshold_ms: (sampling_ms as f64 * 1.2).round(),
            ..Self::default()
        }
    }

    pub fn with_time_drift_threshold(mut self, ms: f64) -> Self {
        self.time_drift_threshold_ms = ms;
        self
    }

    pub fn with_position_drift_threshold(mut self, threshold: f64) -> Self {
        self.position_drift_threshold = threshold;
        self
    }

    pub fn with_name_override(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    /// Effective time threshold in milliseconds.
    pub fn time_drift_threshold(&self) -> f64 {
        positive_or(self.time_drift_threshold_ms, Self::DEFAULT_TIME_DRIFT_MS)
    }

    /// Effective position threshold.
    pub fn position_drift_threshold(&self) -> f64 {
        positive_or(self.position_drift_threshold, Self::DEFAULT_POSITION_DRIFT)
    }
}

impl Default for ItemOptions {
    fn default() -> Self {
        Self {
            time_drift_threshold_ms: Self::DEFAULT_TIME_DRIFT_MS,
            position_drift_threshold: Self::DEFAULT_POSITION_DRIFT,
            name_override: None,
        }
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}
