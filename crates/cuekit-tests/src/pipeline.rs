//! Integration tests for the detection pipeline.
//!
//! Raw records go through cuekit-timeline clustering and come out as
//! cuekit-compose WebVTT tracks and timeline metadata.

use assert_matches::assert_matches;
use cuekit_compose::{split_timeline_entries, EditAction, LabelEdit, TimeRange, Track};
use cuekit_core::CueKitError;
use cuekit_timeline::{
    appearance_ms, build_subject_timelines, build_subject_timeseries, build_timelines,
    from_metadata_json, to_metadata_json, ExternalImageIdResolver, ItemOptions, RawDetection,
    Timeseries,
};
use serde_json::json;

use crate::init_tracing;

// ── Helpers ────────────────────────────────────────────────────

fn celeb(ts: i64) -> serde_json::Value {
    json!({
        "Timestamp": ts,
        "Celebrity": {
            "Name": "Jane Doe",
            "Confidence": 95.0,
            "BoundingBox": { "Left": 0.375, "Top": 0.125, "Width": 0.25, "Height": 0.25 },
        },
    })
}

fn records(values: Vec<serde_json::Value>) -> Vec<RawDetection> {
    values
        .into_iter()
        .map(|v| RawDetection::from_value(v).unwrap())
        .collect()
}

fn resolver() -> ExternalImageIdResolver {
    ExternalImageIdResolver::default()
}

// ── Clustering ─────────────────────────────────────────────────

#[test]
fn celeb_runs_split_on_gaps() {
    init_tracing();
    let batch = records(vec![celeb(0), celeb(1000), celeb(2000), celeb(6000), celeb(7000)]);
    let timelines = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();

    assert_eq!(timelines.len(), 2);
    assert_eq!((timelines[0].begin, timelines[0].end), (0, 2000));
    assert_eq!(timelines[0].count, 3);
    assert_eq!((timelines[1].begin, timelines[1].end), (6000, 7000));
    assert_eq!(appearance_ms(&timelines), 3000);
}

#[test]
fn sampling_interval_widens_time_threshold() {
    init_tracing();
    let batch = records(vec![celeb(0), celeb(2000), celeb(4000)]);

    let default = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();
    assert_eq!(default.len(), 3);

    let sampled = build_timelines(&batch, &ItemOptions::from_sampling_ms(2000), &resolver()).unwrap();
    assert_eq!(sampled.len(), 1);
    assert_eq!(sampled[0].end, 4000);
}

#[test]
fn mixed_batch_groups_by_subject() {
    init_tracing();
    let batch = records(vec![
        json!({ "Timestamp": 0, "Label": { "Name": "Car", "Confidence": 64.0 } }),
        json!({ "Timestamp": 0, "TextDetection": { "DetectedText": "STOP", "Type": "WORD" } }),
        json!({ "Timestamp": 500, "Label": { "Name": "Dog", "Confidence": 70.0 } }),
        json!({ "Timestamp": 1000, "Label": { "Name": "Car", "Confidence": 25.0 } }),
        json!({ "Timestamp": 1000, "TextDetection": { "DetectedText": "STOP", "Type": "LINE" } }),
    ]);
    let subjects = build_subject_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();

    let names: Vec<&str> = subjects.keys().map(String::as_str).collect();
    assert_eq!(names, ["Car", "Dog", "STOP"]);
    let car = &subjects["Car"];
    assert_eq!(car.len(), 1);
    assert_eq!(car[0].confidence, Some(40.0));
    assert_eq!(car[0].count, 2);
    assert_eq!(subjects["STOP"][0].count, 1);
}

#[test]
fn one_unrecognized_record_fails_the_batch() {
    init_tracing();
    let batch = records(vec![celeb(0), json!({ "Timestamp": 40, "Unknown": {} })]);
    let err = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap_err();
    assert_matches!(err, CueKitError::UnrecognizedRecord);
}

// ── WebVTT output ──────────────────────────────────────────────

#[test]
fn timelines_round_trip_through_webvtt() {
    init_tracing();
    let batch = records(vec![celeb(0), celeb(1000), celeb(6000)]);
    let timelines = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();
    let track = Track::from_timelines(&timelines);

    let body = track.to_string();
    assert!(body.starts_with("WEBVTT\n\n0\n00:00:00.000 --> 00:00:01.000 align:center"));
    assert!(body.contains("Jane Doe\n<c.confidence>(95%)</c>"));

    let parsed = Track::parse(&body).unwrap();
    assert_eq!(parsed, track);
}

#[test]
fn single_detection_gets_minimum_cue_length() {
    init_tracing();
    let batch = records(vec![celeb(6000)]);
    let timelines = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();
    let track = Track::from_timelines(&timelines);
    assert_eq!(track.cues()[0].begin_ms(), 6000);
    assert_eq!(track.cues()[0].end_ms(), 6100);
}

// ── Metadata output ────────────────────────────────────────────

#[test]
fn face_matches_carry_face_id_into_metadata() {
    init_tracing();
    let batch = records(
        (0..3)
            .map(|i| {
                json!({
                    "Timestamp": i * 500,
                    "Person": {
                        "Index": 0,
                        "BoundingBox": { "Left": 0.25, "Top": 0.25, "Width": 0.5, "Height": 0.5 },
                    },
                    "FaceMatches": [{
                        "Similarity": 99.0,
                        "Face": { "FaceId": "f-42", "ExternalImageId": "6a6f686e5f736d697468" },
                    }],
                })
            })
            .collect(),
    );
    let timelines = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();
    assert_eq!(timelines.len(), 1);
    assert_eq!(timelines[0].name.as_deref(), Some("John Smith"));

    let entries = from_metadata_json(&to_metadata_json(&timelines).unwrap()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].face_id.as_deref(), Some("f-42"));
    assert_eq!(entries[0].count, 3);
    assert_eq!(entries[0].confidence, Some(99.0));
    assert_eq!((entries[0].begin, entries[0].end), (0, 1000));
}

// ── Timeseries output ──────────────────────────────────────────

#[test]
fn timeseries_appearance_matches_timelines() {
    init_tracing();
    let batch = records(vec![celeb(0), celeb(1000), celeb(2000), celeb(6000), celeb(7000)]);
    let timelines = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();
    let series =
        build_subject_timeseries(&batch, &ItemOptions::default(), &resolver(), 120_000).unwrap();

    let jane = &series["Jane Doe"];
    assert_eq!(jane.appearance, appearance_ms(&timelines));
    assert_eq!(jane.data.len(), 5);
    assert_eq!(jane.data[3].x, 6000);
    assert_eq!(jane.data[0].details[0].c, Some(95.0));
    assert_eq!(jane.data[0].details[0].l, Some(0.375));

    let json = jane.to_json().unwrap();
    assert_eq!(&Timeseries::from_json(&json).unwrap(), jane);
}

// ── Label edits ────────────────────────────────────────────────

#[test]
fn relabel_moves_one_run_to_a_new_track() {
    init_tracing();
    let batch = records(vec![celeb(0), celeb(1000), celeb(6000), celeb(7000)]);
    let timelines = build_timelines(&batch, &ItemOptions::default(), &resolver()).unwrap();
    let body = Track::from_timelines(&timelines).to_string();

    let edit = LabelEdit::new("celeb", "John Roe", EditAction::Apply, vec![TimeRange::new(5000, 8000)]);
    let edited = Track::parse(&body).unwrap().apply_edit(&edit).unwrap();
    assert_eq!(edited.original.len(), 1);
    assert_eq!(edited.modified.len(), 1);
    assert_eq!(edited.modified.cues()[0].begin_ms(), 6000);
    assert!(edited.modified.to_string().contains("<c.celeb>John Roe</c>"));

    let entries = from_metadata_json(&to_metadata_json(&timelines).unwrap()).unwrap();
    let (kept, moved) = split_timeline_entries(entries, &edit).unwrap();
    assert_eq!((kept.len(), moved.len()), (1, 1));
    assert_eq!(moved[0].begin, 6000);
}
