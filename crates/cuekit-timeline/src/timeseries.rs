//! Per-subject detection timeseries.
//!
//! Alongside its timelines every subject gets a chart-friendly series: one
//! point per sampled timestamp holding how many detections were seen and
//! their boxes, plus the subject's total appearance.

use std::collections::BTreeMap;

use cuekit_core::{CueKitError, Result};
use serde::{Deserialize, Serialize};

use crate::builder::appearance_ms;
use crate::detection::{DetectionItem, DetectionKind};

/// One detection at a timestamp. Confidence has two decimals, box fields four.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl From<&DetectionItem> for TimeseriesDetail {
    fn from(item: &DetectionItem) -> Self {
        let bbox = &item.bounding_box;
        Self {
            c: item.confidence.map(|c| round_to(c, 2)),
            w: bbox.width.map(|v| round_to(v, 4)),
            h: bbox.height.map(|v| round_to(v, 4)),
            l: bbox.left.map(|v| round_to(v, 4)),
            t: bbox.top.map(|v| round_to(v, 4)),
            // face attributes vary per detection
            desc: match item.kind {
                DetectionKind::Face => item.parent_name.clone(),
                _ => None,
            },
        }
    }
}

/// All detections at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    /// Timestamp in milliseconds.
    pub x: i64,
    /// Number of detections.
    pub y: usize,
    pub details: Vec<TimeseriesDetail>,
}

/// The series written for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeseries {
    pub label: String,
    /// First category text seen, e.g. a label's parents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_id: Option<String>,
    pub data: Vec<TimeseriesPoint>,
    /// Media duration in milliseconds, at least 1.
    pub duration: i64,
    /// Summed timeline spans in milliseconds.
    pub appearance: i64,
}

impl Timeseries {
    /// Build the series of one subject from its individual detections and
    /// the timelines clustered from them.
    ///
    /// Unusable detections are left out. Returns `None` when nothing usable
    /// remains.
    pub fn from_detections(
        label: impl Into<String>,
        detections: &[DetectionItem],
        timelines: &[DetectionItem],
        duration_ms: i64,
    ) -> Option<Self> {
        let mut points: BTreeMap<i64, Vec<TimeseriesDetail>> = BTreeMap::new();
        let mut desc = None;
        let mut face_id = None;

        for item in detections.iter().filter(|item| item.can_use()) {
            if desc.is_none() && item.kind != DetectionKind::Face {
                desc = item.parent_name.clone();
            }
            if face_id.is_none() {
                face_id = item.face_id().map(str::to_string);
            }
            points.entry(item.begin).or_default().push(TimeseriesDetail::from(item));
        }

        if points.is_empty() {
            return None;
        }

        Some(Self {
            label: label.into(),
            desc,
            face_id,
            data: points
                .into_iter()
                .map(|(x, details)| TimeseriesPoint {
                    x,
                    y: details.len(),
                    details,
                })
                .collect(),
            duration: duration_ms.max(1),
            appearance: appearance_ms(timelines),
        })
    }

    /// Largest number of detections at any one timestamp.
    pub fn peak(&self) -> usize {
        self.data.iter().map(|p| p.y).max().unwrap_or(0)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CueKitError::Serialization(format!("Failed to serialize timeseries: {}", e)))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data)
            .map_err(|e| CueKitError::Serialization(format!("Invalid timeseries: {}", e)))
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
