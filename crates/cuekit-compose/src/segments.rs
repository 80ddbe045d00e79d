//! Rendering shot and technical-cue segments.

use std::path::Path;
use std::sync::LazyLock;

use cuekit_timeline::Segment;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::edl::{EdlComposer, EdlEvent};
use crate::webvtt::{TimeUnit, Track};

static NON_WORD_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

/// Fixed on-screen placement for a segment track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuePlacement {
    /// `start`, `center` or `end`.
    pub align: String,
    /// Line, in percent of the frame height.
    pub line: u32,
    /// Position, in percent of the frame width.
    pub position: u32,
}

impl CuePlacement {
    /// Top left, used for shots.
    pub fn shot() -> Self {
        Self {
            align: "start".to_string(),
            line: 0,
            position: 0,
        }
    }

    /// Top right, used for technical cues.
    pub fn technical_cue() -> Self {
        Self {
            align: "end".to_string(),
            line: 0,
            position: 100,
        }
    }

    /// WebVTT cue settings.
    pub fn settings(&self) -> String {
        format!(
            "align:{} line:{}% position:{}% size:25%",
            self.align, self.line, self.position
        )
    }
}

impl Default for CuePlacement {
    fn default() -> Self {
        Self::shot()
    }
}

/// One cue per segment: its name and two-decimal confidence.
pub fn segments_to_track(segments: &[Segment], placement: &CuePlacement) -> Track {
    let settings = placement.settings();
    let mut track = Track::new(TimeUnit::Milliseconds);
    for segment in segments {
        let text = match segment.confidence {
            Some(confidence) => {
                format!("{} <c.confidence>({:.2})</c>", segment.name, confidence)
            }
            None => segment.name.clone(),
        };
        track.add_cue(
            segment.begin as f64,
            segment.end as f64,
            text,
            settings.as_str(),
        );
    }
    track
}

/// EDL with one event per segment, reel named after the segment and clip
/// named after the source file.
pub fn segments_to_edl(segments: &[Segment], source_path: &str) -> String {
    let path = Path::new(source_path);
    let clip_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title = NON_WORD_RUN_RE.replace_all(&stem, " ");

    let events = segments
        .iter()
        .map(|s| {
            EdlEvent::new(
                s.name.as_str(),
                clip_name.as_str(),
                s.smpte_begin.as_str(),
                s.smpte_end.as_str(),
            )
        })
        .collect();
    EdlComposer::new(title, events).compose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuekit_timeline::SegmentKind;

    fn shot(index: u32, begin: i64, end: i64, smpte: (&str, &str)) -> Segment {
        Segment {
            kind: SegmentKind::Shot,
            name: format!("Shot #{}", index),
            confidence: Some(99.456),
            begin,
            end,
            smpte_begin: smpte.0.to_string(),
            smpte_end: smpte.1.to_string(),
        }
    }

    #[test]
    fn test_placement_settings() {
        assert_eq!(
            CuePlacement::shot().settings(),
            "align:start line:0% position:0% size:25%"
        );
        assert_eq!(
            CuePlacement::technical_cue().settings(),
            "align:end line:0% position:100% size:25%"
        );
        let custom: CuePlacement = serde_json::from_str(r#"{"position": 50}"#).unwrap();
        assert_eq!(custom.align, "start");
        assert_eq!(custom.position, 50);
    }

    #[test]
    fn test_segments_to_track() {
        let segments = [shot(0, 0, 2000, ("00:00:00:00", "00:00:02:00"))];
        let track = segments_to_track(&segments, &CuePlacement::shot());
        assert_eq!(
            track.to_string(),
            "WEBVTT\n\n0\n00:00:00.000 --> 00:00:02.000 align:start line:0% position:0% size:25%\n\
             Shot #0 <c.confidence>(99.46)</c>\n\n"
        );
    }

    #[test]
    fn test_segments_to_edl() {
        let segments = [
            shot(0, 0, 2000, ("00:00:00:00", "00:00:02:00")),
            shot(1, 2000, 4000, ("00:00:02:00", "00:00:04:00")),
        ];
        let edl = segments_to_edl(&segments, "uploads/My_Movie (final).mp4");
        let lines: Vec<&str> = edl.lines().collect();
        assert_eq!(lines[0], "TITLE: MY MOVIE FINAL ");
        assert_eq!(lines[1], "FCM: NON-DROP FRAME");
        assert_eq!(
            lines[3],
            "001  SHOT0  V     C     00:00:00:00 00:00:02:00 00:00:00:00 00:00:02:00"
        );
        assert_eq!(lines[4], "* FROM CLIP NAME: My_Movie (final).mp4");
        assert!(lines[6].starts_with("002  SHOT1  V"));
    }
}
