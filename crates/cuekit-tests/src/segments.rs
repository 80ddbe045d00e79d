//! Integration tests for shot and technical-cue output.

use cuekit_compose::{segments_to_edl, segments_to_track, CuePlacement, Track};
use cuekit_timeline::{split_segments, RawSegment};

use crate::init_tracing;

// ── Helpers ────────────────────────────────────────────────────

const SEGMENTS: &str = r#"[
    {
        "Type": "TECHNICAL_CUE",
        "StartTimestampMillis": 0,
        "EndTimestampMillis": 1001,
        "StartTimecodeSMPTE": "00:00:00;00",
        "EndTimecodeSMPTE": "00:00:01;00",
        "TechnicalCueSegment": { "Type": "BlackFrames", "Confidence": 99.5 }
    },
    {
        "Type": "SHOT",
        "StartTimestampMillis": 1001,
        "EndTimestampMillis": 4004,
        "StartTimecodeSMPTE": "00:00:01;00",
        "EndTimecodeSMPTE": "00:00:04;00",
        "ShotSegment": { "Index": 0, "Confidence": 97.25 }
    },
    {
        "Type": "SHOT",
        "StartTimestampMillis": 4004,
        "EndTimestampMillis": 9009,
        "StartTimecodeSMPTE": "00:00:04;00",
        "EndTimecodeSMPTE": "00:00:09;00",
        "ShotSegment": { "Index": 1, "Confidence": 88.0 }
    }
]"#;

// ── Tracks ─────────────────────────────────────────────────────

#[test]
fn shots_and_cues_render_to_separate_tracks() {
    init_tracing();
    let raw = RawSegment::parse_batch(SEGMENTS).unwrap();
    let (shots, cues) = split_segments(&raw);

    let shot_track = segments_to_track(&shots, &CuePlacement::shot());
    assert_eq!(shot_track.len(), 2);
    assert_eq!(shot_track.cues()[0].text, "Shot #0 <c.confidence>(97.25)</c>");
    assert_eq!(shot_track.cues()[1].position, "align:start line:0% position:0% size:25%");

    let cue_track = segments_to_track(&cues, &CuePlacement::technical_cue());
    assert_eq!(cue_track.cues()[0].text, "BlackFrames <c.confidence>(99.50)</c>");
    assert_eq!(cue_track.cues()[0].position, "align:end line:0% position:100% size:25%");

    let parsed = Track::parse(&shot_track.to_string()).unwrap();
    assert_eq!(parsed, shot_track);
}

// ── EDL ────────────────────────────────────────────────────────

#[test]
fn drop_frame_segments_render_drop_frame_edl() {
    init_tracing();
    let raw = RawSegment::parse_batch(SEGMENTS).unwrap();
    let (shots, cues) = split_segments(&raw);

    let edl = segments_to_edl(&shots, "media/Big_Buck-Bunny.mp4");
    assert_eq!(
        edl,
        "TITLE: BIG BUCK BUNNY\n\
         FCM: DROP FRAME\n\
         \n\
         001  SHOT0  V     C     00:00:01:00 00:00:04:00 00:00:01:00 00:00:04:00\n\
         * FROM CLIP NAME: Big_Buck-Bunny.mp4\n\
         \n\
         002  SHOT1  V     C     00:00:04:00 00:00:09:00 00:00:04:00 00:00:09:00\n\
         * FROM CLIP NAME: Big_Buck-Bunny.mp4\n\
         \n"
    );

    let cue_edl = segments_to_edl(&cues, "media/Big_Buck-Bunny.mp4");
    assert!(cue_edl.contains("001  CKFRAMES  V     C     00:00:00:00"));
}
