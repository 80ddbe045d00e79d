//! Timeline metadata JSON.
//!
//! A compact per-timeline summary that is written next to the WebVTT track
//! so players can list appearances without parsing cues.

use cuekit_core::{CueKitError, Result};
use serde::{Deserialize, Serialize};

use crate::detection::DetectionItem;

/// One timeline as written to the metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rounded to two decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub begin: i64,
    pub end: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cy: Option<f64>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_id: Option<String>,
}

impl From<&DetectionItem> for TimelineEntry {
    fn from(item: &DetectionItem) -> Self {
        Self {
            name: item.name.clone(),
            confidence: item.confidence.map(|c| (c * 100.0).round() / 100.0),
            begin: item.begin,
            end: item.end,
            cx: item.center_x(),
            cy: item.center_y(),
            count: item.count,
            face_id: item.face_id().map(str::to_string),
        }
    }
}

/// Serialize timelines to the metadata JSON array.
pub fn to_metadata_json(timelines: &[DetectionItem]) -> Result<String> {
    let entries: Vec<TimelineEntry> = timelines.iter().map(TimelineEntry::from).collect();
    serde_json::to_string(&entries)
        .map_err(|e| CueKitError::Serialization(format!("Failed to serialize timelines: {}", e)))
}

/// Read a metadata JSON array back.
pub fn from_metadata_json(data: &str) -> Result<Vec<TimelineEntry>> {
    serde_json::from_str(data)
        .map_err(|e| CueKitError::Serialization(format!("Invalid timeline metadata: {}", e)))
}
