//! CueKit Timeline - Detection timeline data model
//!
//! Turns raw per-frame detection records into clustered timelines:
//! - Loosely typed record envelope and variant discrimination
//! - Typed detection items with per-variant usability and cue rendering
//! - Drift-based run detection and geometric-mean reduction
//! - Per-subject timeseries for charts
//! - Segment (shot / technical cue) records

pub mod builder;
pub mod detection;
pub mod face_name;
pub mod metadata;
pub mod options;
pub mod queue;
pub mod record;
pub mod segment;
pub mod timeseries;

pub use builder::{
    appearance_ms, build_subject_timelines, build_subject_timeseries, build_timelines,
    TimelineBuilder,
};
pub use detection::{DetectionItem, DetectionKind};
pub use face_name::{ExternalImageIdResolver, FaceNameResolver, Fallback};
pub use metadata::{from_metadata_json, to_metadata_json, TimelineEntry};
pub use options::ItemOptions;
pub use queue::{geometric_mean, position_drift_exceeds, time_drift_exceeds, TimelineQueue};
pub use record::{RawDetection, TypedRecord};
pub use segment::{split_segments, RawSegment, Segment, SegmentKind};
pub use timeseries::{Timeseries, TimeseriesDetail, TimeseriesPoint};
