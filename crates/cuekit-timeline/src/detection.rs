//! Typed detection items.
//!
//! Every detector output is normalized into one [`DetectionItem`] shape; the
//! [`DetectionKind`] discriminant keeps the per-variant rules for usability
//! and cue rendering.

use std::fmt;

use cuekit_core::{BoundingBox, CueKitError, Result};

use crate::face_name::{Fallback, FaceNameResolver};
use crate::options::ItemOptions;
use crate::record::{RawDetection, RawEmotion, RawFaceDetail, TypedRecord};

/// Which detector produced an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionKind {
    Celeb,
    Label,
    /// A face matched against a face collection.
    FaceMatch {
        face_id: Option<String>,
    },
    Moderation,
    Person,
    Face,
    CustomLabel,
    Text,
}

impl DetectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celeb => "celeb",
            Self::Label => "label",
            Self::FaceMatch { .. } => "face_match",
            Self::Moderation => "moderation",
            Self::Person => "person",
            Self::Face => "face",
            Self::CustomLabel => "custom_label",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detection, or a run of detections folded together.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionItem {
    pub kind: DetectionKind,
    /// Primary label. `None` marks the item unusable for some kinds.
    pub name: Option<String>,
    /// Category or attribute text.
    pub parent_name: Option<String>,
    /// Detector confidence on a 0-100 scale.
    pub confidence: Option<f64>,
    /// First timestamp in milliseconds.
    pub begin: i64,
    /// Last timestamp in milliseconds, never before `begin`.
    pub end: i64,
    pub bounding_box: BoundingBox,
    /// Number of raw detections folded into this item.
    pub count: usize,
    pub time_drift_threshold: f64,
    pub position_drift_threshold: f64,
}

impl DetectionItem {
    /// Create an item spanning `begin..=end` with thresholds from `options`.
    pub fn new(kind: DetectionKind, begin: i64, end: i64, options: &ItemOptions) -> Self {
        Self {
            kind,
            name: None,
            parent_name: None,
            confidence: None,
            begin,
            end: end.max(begin),
            bounding_box: BoundingBox::EMPTY,
            count: 1,
            time_drift_threshold: options.time_drift_threshold(),
            position_drift_threshold: options.position_drift_threshold(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_empty(Some(name.into()));
        self
    }

    pub fn with_parent_name(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = non_empty(Some(parent_name.into()));
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    /// Build a typed item from a raw record.
    ///
    /// The variant is picked by [`RawDetection::typed`]; the item covers the
    /// single instant of the record's timestamp.
    pub fn from_record(
        record: &RawDetection,
        options: &ItemOptions,
        resolver: &dyn FaceNameResolver,
    ) -> Result<Self> {
        let typed = record.typed()?;
        let ts = record.timestamp_ms()?;

        let item = match typed {
            TypedRecord::Celebrity(celeb) => {
                let face = celeb.face.as_ref();
                let mut item = Self::new(DetectionKind::Celeb, ts, ts, options);
                item.name = non_empty(celeb.name.clone());
                item.confidence = celeb.confidence.or(face.and_then(|f| f.confidence));
                item.bounding_box = celeb
                    .bounding_box
                    .or(face.and_then(|f| f.bounding_box))
                    .unwrap_or_default();
                item
            }
            TypedRecord::ModerationLabel(moderation) => {
                let mut item = Self::new(DetectionKind::Moderation, ts, ts, options);
                item.name = non_empty(options.name_override.clone())
                    .or_else(|| non_empty(moderation.name.clone()));
                item.parent_name = non_empty(moderation.parent_name.clone());
                item.confidence = moderation.confidence;
                item
            }
            TypedRecord::Label(label) => {
                let parents: Vec<&str> = label
                    .parents
                    .iter()
                    .filter_map(|p| p.name.as_deref())
                    .collect();
                let mut item = Self::new(DetectionKind::Label, ts, ts, options);
                item.name = non_empty(label.name.clone());
                item.parent_name = non_empty(Some(parents.join(", ")));
                item.confidence = label.confidence;
                item.bounding_box = label
                    .instances
                    .first()
                    .and_then(|i| i.bounding_box)
                    .unwrap_or_default();
                item
            }
            TypedRecord::FaceMatches(matches, person) => {
                let best = matches.first().ok_or_else(|| {
                    CueKitError::MalformedRecord("FaceMatches is empty".to_string())
                })?;
                let face = &best.face;
                let face_id = non_empty(face.face_id.clone());
                let fallback = face_id.as_deref().map_or(Fallback::Undefined, Fallback::Value);
                let name = non_empty(face.name.clone()).or_else(|| {
                    face.external_image_id
                        .as_deref()
                        .and_then(|id| resolver.resolve(id, fallback))
                });

                let mut item = Self::new(DetectionKind::FaceMatch { face_id }, ts, ts, options);
                item.name = non_empty(name);
                item.parent_name = person
                    .and_then(|p| p.index)
                    .map(|index| format!("Index {}", index));
                item.confidence = best.similarity;
                item.bounding_box = person
                    .and_then(|p| {
                        p.bounding_box
                            .or(p.face.as_ref().and_then(|f| f.bounding_box))
                    })
                    .or(face.bounding_box)
                    .unwrap_or_default();
                item
            }
            TypedRecord::CustomLabel(custom) => {
                let mut item = Self::new(DetectionKind::CustomLabel, ts, ts, options);
                item.name = non_empty(custom.name.clone());
                item.confidence = custom.confidence;
                item.bounding_box = custom
                    .geometry
                    .as_ref()
                    .and_then(|g| g.bounding_box)
                    .unwrap_or_default();
                item
            }
            TypedRecord::Person(person) => {
                let face = person.face.as_ref();
                let mut item = Self::new(DetectionKind::Person, ts, ts, options);
                item.name = person.index.map(|index| index.to_string());
                item.parent_name = join_present(
                    [
                        face.and_then(gender_of),
                        face.and_then(|f| f.age_range).and_then(|r| r.label()),
                    ],
                    " ",
                );
                item.confidence = person.confidence.or(face.and_then(|f| f.confidence));
                item.bounding_box = person.bounding_box.unwrap_or_default();
                item
            }
            TypedRecord::Face(face) => {
                let mut item = Self::new(DetectionKind::Face, ts, ts, options);
                item.name = gender_of(face);
                item.parent_name = join_present(
                    [
                        face.age_range.and_then(|r| r.label()),
                        top_emotion(&face.emotions),
                    ],
                    " ",
                );
                item.confidence = face.confidence;
                item.bounding_box = face.bounding_box.unwrap_or_default();
                item
            }
            TypedRecord::TextDetection(text) => {
                let mut item = Self::new(DetectionKind::Text, ts, ts, options);
                // Only full lines are shown; WORD detections duplicate them.
                if text.kind.as_deref() == Some("LINE") {
                    item.name = non_empty(text.detected_text.clone());
                }
                item.confidence = text.confidence;
                item.bounding_box = text
                    .geometry
                    .as_ref()
                    .and_then(|g| g.bounding_box)
                    .unwrap_or_default();
                item
            }
        };
        Ok(item)
    }

    /// Whether the item is worth showing.
    pub fn can_use(&self) -> bool {
        match self.kind {
            DetectionKind::Celeb => self.bounding_box.width.is_some(),
            DetectionKind::Person => self.confidence.is_some(),
            DetectionKind::Moderation
            | DetectionKind::FaceMatch { .. }
            | DetectionKind::Face
            | DetectionKind::Text => self.name.is_some(),
            DetectionKind::Label | DetectionKind::CustomLabel => true,
        }
    }

    #[inline]
    pub fn center_x(&self) -> Option<f64> {
        self.bounding_box.center_x()
    }

    #[inline]
    pub fn center_y(&self) -> Option<f64> {
        self.bounding_box.center_y()
    }

    pub fn face_id(&self) -> Option<&str> {
        match &self.kind {
            DetectionKind::FaceMatch { face_id } => face_id.as_deref(),
            _ => None,
        }
    }

    /// Span in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.end - self.begin
    }

    /// WebVTT cue payload: name, parent in `c.small`, rounded confidence.
    pub fn cue_text(&self) -> String {
        let confidence = self
            .confidence
            .map(|c| format!("<c.confidence>({}%)</c>", c.round()));
        let small = self
            .parent_name
            .as_ref()
            .map(|p| format!("<c.small>{}</c>", p));

        let lines = match self.kind {
            DetectionKind::FaceMatch { .. } => {
                vec![self.name.as_ref().map(|n| n.replace('_', " ")), confidence]
            }
            DetectionKind::Person => vec![
                self.name.as_ref().map(|n| format!("Person {}", n)),
                small,
                confidence,
            ],
            _ => vec![self.name.clone(), small, confidence],
        };
        lines.into_iter().flatten().collect::<Vec<_>>().join("\n")
    }

    /// WebVTT cue settings placing the cue over the detection's center.
    pub fn cue_alignment(&self) -> String {
        let (cx, cy) = (self.center_x(), self.center_y());
        if self.kind == DetectionKind::CustomLabel && (cx.is_none() || cy.is_none()) {
            return "align:end line:0% position:100% size:25%".to_string();
        }
        let line = (cy.unwrap_or(0.5) * 100.0).floor();
        let position = (cx.unwrap_or(0.5) * 100.0).floor();
        format!("align:center line:{}% position:{}% size:25%", line, position)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn join_present<const N: usize>(parts: [Option<String>; N], sep: &str) -> Option<String> {
    let parts: Vec<String> = parts.into_iter().flatten().filter(|p| !p.is_empty()).collect();
    non_empty(Some(parts.join(sep)))
}

fn gender_of(face: &RawFaceDetail) -> Option<String> {
    non_empty(face.gender.as_ref().and_then(|g| g.value.clone()))
}

/// Emotion with the highest confidence; the earliest wins ties.
fn top_emotion(emotions: &[RawEmotion]) -> Option<String> {
    let mut best: Option<&RawEmotion> = None;
    for emotion in emotions {
        let score = emotion.confidence.unwrap_or(f64::NEG_INFINITY);
        let best_score = best.and_then(|b| b.confidence).unwrap_or(f64::NEG_INFINITY);
        if best.is_none() || score > best_score {
            best = Some(emotion);
        }
    }
    best.and_then(|e| e.kind.clone())
}
