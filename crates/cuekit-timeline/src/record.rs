//! Loosely typed envelope for raw detection records.
//!
//! Upstream detectors emit JSON objects that carry exactly one marker field
//! (`Celebrity`, `ModerationLabel`, `Label`, `FaceMatches`, `CustomLabel`,
//! `Person`, `Face`, `TextDetection`) plus a `Timestamp`. Every marker is
//! optional here; [`RawDetection::typed`] picks the variant.

use cuekit_core::{BoundingBox, CueKitError, Result};
use serde::{Deserialize, Serialize};

/// A raw detection record as received from the collection stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDetection {
    /// Milliseconds from the start of the media, as a number or a numeric string.
    pub timestamp: Option<RawTimestamp>,
    pub celebrity: Option<RawCelebrity>,
    pub moderation_label: Option<RawModerationLabel>,
    pub label: Option<RawLabel>,
    pub face_matches: Option<Vec<RawFaceMatch>>,
    pub custom_label: Option<RawCustomLabel>,
    pub person: Option<RawPerson>,
    pub face: Option<RawFaceDetail>,
    pub text_detection: Option<RawTextDetection>,
}

/// The marker a record was discriminated by, borrowing its payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedRecord<'a> {
    Celebrity(&'a RawCelebrity),
    ModerationLabel(&'a RawModerationLabel),
    Label(&'a RawLabel),
    FaceMatches(&'a [RawFaceMatch], Option<&'a RawPerson>),
    CustomLabel(&'a RawCustomLabel),
    Person(&'a RawPerson),
    Face(&'a RawFaceDetail),
    TextDetection(&'a RawTextDetection),
}

impl RawDetection {
    /// Decode a record from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| CueKitError::Serialization(format!("Invalid detection record: {}", e)))
    }

    /// Decode a JSON array of records.
    pub fn parse_batch(data: &str) -> Result<Vec<Self>> {
        serde_json::from_str(data)
            .map_err(|e| CueKitError::Serialization(format!("Invalid detection batch: {}", e)))
    }

    /// Pick the record variant by marker precedence. The first marker present
    /// wins; a record with none is rejected.
    pub fn typed(&self) -> Result<TypedRecord<'_>> {
        if let Some(celebrity) = &self.celebrity {
            return Ok(TypedRecord::Celebrity(celebrity));
        }
        if let Some(moderation) = &self.moderation_label {
            return Ok(TypedRecord::ModerationLabel(moderation));
        }
        if let Some(label) = &self.label {
            return Ok(TypedRecord::Label(label));
        }
        if let Some(matches) = &self.face_matches {
            return Ok(TypedRecord::FaceMatches(matches, self.person.as_ref()));
        }
        if let Some(custom) = &self.custom_label {
            return Ok(TypedRecord::CustomLabel(custom));
        }
        if let Some(person) = &self.person {
            return Ok(TypedRecord::Person(person));
        }
        if let Some(face) = &self.face {
            return Ok(TypedRecord::Face(face));
        }
        if let Some(text) = &self.text_detection {
            return Ok(TypedRecord::TextDetection(text));
        }
        Err(CueKitError::UnrecognizedRecord)
    }

    /// Timestamp in whole milliseconds.
    pub fn timestamp_ms(&self) -> Result<i64> {
        match &self.timestamp {
            Some(ts) => ts.to_millis(),
            None => Err(CueKitError::MalformedRecord("missing Timestamp".to_string())),
        }
    }
}

/// `Timestamp` is a number in some detector outputs and a string in others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(f64),
    Text(String),
}

impl RawTimestamp {
    pub fn to_millis(&self) -> Result<i64> {
        let value = match self {
            Self::Millis(ms) => *ms,
            Self::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                CueKitError::MalformedRecord(format!("invalid Timestamp {:?}", text))
            })?,
        };
        if !value.is_finite() {
            return Err(CueKitError::MalformedRecord(format!(
                "invalid Timestamp {}",
                value
            )));
        }
        Ok(value.round() as i64)
    }
}

impl From<i64> for RawTimestamp {
    fn from(ms: i64) -> Self {
        Self::Millis(ms as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCelebrity {
    pub name: Option<String>,
    pub confidence: Option<f64>,
    pub bounding_box: Option<BoundingBox>,
    pub face: Option<RawFaceDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawModerationLabel {
    pub name: Option<String>,
    pub parent_name: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLabel {
    pub name: Option<String>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub parents: Vec<RawParent>,
    #[serde(default)]
    pub instances: Vec<RawInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawParent {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawInstance {
    pub bounding_box: Option<BoundingBox>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawFaceMatch {
    pub similarity: Option<f64>,
    #[serde(default)]
    pub face: RawMatchedFace,
}

/// A face from a face collection that a detection was matched against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawMatchedFace {
    pub face_id: Option<String>,
    pub external_image_id: Option<String>,
    pub name: Option<String>,
    pub confidence: Option<f64>,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPerson {
    pub index: Option<i64>,
    pub confidence: Option<f64>,
    pub bounding_box: Option<BoundingBox>,
    pub face: Option<RawFaceDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawFaceDetail {
    pub confidence: Option<f64>,
    pub bounding_box: Option<BoundingBox>,
    pub gender: Option<RawAttribute>,
    pub age_range: Option<RawAgeRange>,
    #[serde(default)]
    pub emotions: Vec<RawEmotion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawAttribute {
    pub value: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawAgeRange {
    pub low: Option<u32>,
    pub high: Option<u32>,
}

impl RawAgeRange {
    /// `(low - high)`, when both bounds are known.
    pub fn label(&self) -> Option<String> {
        Some(format!("({} - {})", self.low?, self.high?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEmotion {
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCustomLabel {
    pub name: Option<String>,
    pub confidence: Option<f64>,
    pub geometry: Option<RawGeometry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGeometry {
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTextDetection {
    pub detected_text: Option<String>,
    /// `LINE` or `WORD`.
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub confidence: Option<f64>,
    pub geometry: Option<RawGeometry>,
}
