//! Shot and technical-cue segments.

use cuekit_core::{CueKitError, Result};
use serde::{Deserialize, Serialize};

/// A segment record as received from the segment detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSegment {
    /// `SHOT` or `TECHNICAL_CUE`.
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub start_timestamp_millis: i64,
    #[serde(default)]
    pub end_timestamp_millis: i64,
    #[serde(rename = "StartTimecodeSMPTE", default)]
    pub start_timecode_smpte: String,
    #[serde(rename = "EndTimecodeSMPTE", default)]
    pub end_timecode_smpte: String,
    pub shot_segment: Option<RawShotSegment>,
    pub technical_cue_segment: Option<RawTechnicalCueSegment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawShotSegment {
    pub index: Option<i64>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTechnicalCueSegment {
    /// e.g. `BlackFrames`, `ColorBars`, `EndCredits`.
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub confidence: Option<f64>,
}

impl RawSegment {
    /// Decode a JSON array of segment records.
    pub fn parse_batch(data: &str) -> Result<Vec<Self>> {
        serde_json::from_str(data)
            .map_err(|e| CueKitError::Serialization(format!("Invalid segment batch: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Shot,
    TechnicalCue,
}

/// A segment normalized for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(skip)]
    pub kind: SegmentKind,
    pub name: String,
    pub confidence: Option<f64>,
    /// Milliseconds.
    pub begin: i64,
    pub end: i64,
    /// SMPTE timecode of the first frame, `;` separated for drop frame.
    pub smpte_begin: String,
    pub smpte_end: String,
}

impl Segment {
    /// Normalize a raw record. Unknown segment types yield `None`.
    pub fn from_raw(raw: &RawSegment) -> Option<Self> {
        let (kind, name, confidence) = match raw.kind.as_deref() {
            Some("SHOT") => {
                let shot = raw.shot_segment.as_ref();
                let index = shot.and_then(|s| s.index).unwrap_or_default();
                (
                    SegmentKind::Shot,
                    format!("Shot #{}", index),
                    shot.and_then(|s| s.confidence),
                )
            }
            Some("TECHNICAL_CUE") => {
                let cue = raw.technical_cue_segment.as_ref();
                (
                    SegmentKind::TechnicalCue,
                    cue.and_then(|c| c.kind.clone()).unwrap_or_default(),
                    cue.and_then(|c| c.confidence),
                )
            }
            _ => return None,
        };
        Some(Self {
            kind,
            name,
            confidence,
            begin: raw.start_timestamp_millis,
            end: raw.end_timestamp_millis,
            smpte_begin: raw.start_timecode_smpte.clone(),
            smpte_end: raw.end_timecode_smpte.clone(),
        })
    }
}

/// Split raw segments into `(shots, technical_cues)`, keeping input order.
pub fn split_segments(raw: &[RawSegment]) -> (Vec<Segment>, Vec<Segment>) {
    let mut shots = Vec::new();
    let mut cues = Vec::new();
    for segment in raw.iter().filter_map(Segment::from_raw) {
        match segment.kind {
            SegmentKind::Shot => shots.push(segment),
            SegmentKind::TechnicalCue => cues.push(segment),
        }
    }
    (shots, cues)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"[
        {
            "Type": "TECHNICAL_CUE",
            "StartTimestampMillis": 0,
            "EndTimestampMillis": 2002,
            "StartTimecodeSMPTE": "00:00:00;00",
            "EndTimecodeSMPTE": "00:00:02;00",
            "TechnicalCueSegment": { "Type": "BlackFrames", "Confidence": 99.9 }
        },
        {
            "Type": "SHOT",
            "StartTimestampMillis": 2002,
            "EndTimestampMillis": 5005,
            "StartTimecodeSMPTE": "00:00:02;00",
            "EndTimecodeSMPTE": "00:00:05;00",
            "ShotSegment": { "Index": 0, "Confidence": 98.1 }
        },
        { "Type": "UNKNOWN" }
    ]"#;

    #[test]
    fn test_split() {
        let raw = RawSegment::parse_batch(BATCH).unwrap();
        assert_eq!(raw.len(), 3);

        let (shots, cues) = split_segments(&raw);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].name, "Shot #0");
        assert_eq!(shots[0].confidence, Some(98.1));
        assert_eq!((shots[0].begin, shots[0].end), (2002, 5005));
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].name, "BlackFrames");
        assert_eq!(cues[0].smpte_begin, "00:00:00;00");
    }

    #[test]
    fn test_segment_json_uses_camel_case() {
        let raw = RawSegment::parse_batch(BATCH).unwrap();
        let (shots, _) = split_segments(&raw);
        let json = serde_json::to_string(&shots[0]).unwrap();
        assert!(json.contains(r#""smpteBegin":"00:00:02;00""#));
        assert!(!json.contains("kind"));
    }
}
