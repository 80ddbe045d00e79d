//! WebVTT cue tracks.
//!
//! Serialization is exact to the millisecond. Parsing only understands the
//! layout this module writes (an integer index line before every cue) and
//! fails on the first cue whose timing line does not match.

use std::fmt;
use std::sync::LazyLock;

use cuekit_core::{CueKitError, Result, Timestamp};
use cuekit_timeline::DetectionItem;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const HEADER: &str = "WEBVTT";

/// `HH:MM:SS.mmm --> HH:MM:SS.mmm[ settings]`, hours may run past 99.
static CUE_TIMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{2,}):([0-9]{2}):([0-9]{2})\.([0-9]{2,})\s+-->\s+([0-9]{2,}):([0-9]{2}):([0-9]{2})\.([0-9]{2,})(.*)$",
    )
    .expect("valid regex")
});

/// Unit that cue begin/end values are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Multiplier from stored values to milliseconds.
    pub fn factor(self) -> f64 {
        match self {
            Self::Milliseconds => 1.0,
            Self::Seconds => 1000.0,
        }
    }
}

/// Shortest span a cue is widened to when its end does not follow its begin.
const MIN_CUE_MS: f64 = 100.0;

/// One timed cue.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start, in `unit`.
    pub begin: f64,
    /// End, in `unit`. Always after `begin`.
    pub end: f64,
    pub text: String,
    /// Cue settings such as `align:center line:50%`.
    pub position: String,
    pub unit: TimeUnit,
}

impl Cue {
    /// Create a cue. An end at or before `begin` is moved to 100 ms after it.
    pub fn new(
        begin: f64,
        end: f64,
        text: impl Into<String>,
        position: impl Into<String>,
        unit: TimeUnit,
    ) -> Self {
        let end = if end > begin {
            end
        } else {
            begin + MIN_CUE_MS / unit.factor()
        };
        Self {
            begin,
            end,
            text: text.into(),
            position: position.into(),
            unit,
        }
    }

    pub fn begin_ms(&self) -> i64 {
        (self.begin * self.unit.factor()).round() as i64
    }

    pub fn end_ms(&self) -> i64 {
        (self.end * self.unit.factor()).round() as i64
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {}",
            Timestamp::from_milliseconds(self.begin_ms()),
            Timestamp::from_milliseconds(self.end_ms())
        )?;
        if !self.position.is_empty() {
            write!(f, " {}", self.position)?;
        }
        write!(f, "\n{}", self.text)
    }
}

/// An ordered list of cues sharing one time unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    unit: TimeUnit,
    cues: Vec<Cue>,
}

impl Track {
    pub fn new(unit: TimeUnit) -> Self {
        Self {
            unit,
            cues: Vec::new(),
        }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn factor(&self) -> f64 {
        self.unit.factor()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Append a cue built for this track's unit.
    pub fn add_cue(
        &mut self,
        begin: f64,
        end: f64,
        text: impl Into<String>,
        position: impl Into<String>,
    ) {
        self.cues.push(Cue::new(begin, end, text, position, self.unit));
    }

    /// Append an existing cue. Its stored values are rescaled if it was built
    /// for another unit.
    pub fn push(&mut self, mut cue: Cue) {
        if cue.unit != self.unit {
            let scale = cue.unit.factor() / self.unit.factor();
            cue.begin *= scale;
            cue.end *= scale;
            cue.unit = self.unit;
        }
        self.cues.push(cue);
    }

    /// Remove and return the first cue.
    pub fn shift(&mut self) -> Option<Cue> {
        if self.cues.is_empty() {
            None
        } else {
            Some(self.cues.remove(0))
        }
    }

    /// Remove and return the last cue.
    pub fn pop(&mut self) -> Option<Cue> {
        self.cues.pop()
    }

    /// Keep only the first `len` cues.
    pub fn truncate(&mut self, len: usize) {
        self.cues.truncate(len);
    }

    /// One cue per timeline, placed over the detection.
    pub fn from_timelines(timelines: &[DetectionItem]) -> Self {
        let mut track = Self::new(TimeUnit::Milliseconds);
        for item in timelines {
            track.add_cue(
                item.begin as f64,
                item.end as f64,
                item.cue_text(),
                item.cue_alignment(),
            );
        }
        track
    }

    /// Parse a WebVTT body written by [`Track`]'s `Display`.
    ///
    /// The first line is taken as the header. Each cue starts at a line
    /// holding only an integer index; the next line must be a timing line
    /// and the text runs until an empty line or the end of input. Lines
    /// holding only whitespace are part of the text. A missing or
    /// malformed timing line fails the whole parse.
    pub fn parse(body: &str) -> Result<Self> {
        let mut track = Self::new(TimeUnit::Milliseconds);
        let mut lines = body.lines().enumerate().skip(1);

        while let Some((index_no, line)) = lines.next() {
            if !is_cue_index(line) {
                continue;
            }

            let (line_no, timing) = match lines.next() {
                Some(next) => next,
                None => (index_no + 1, ""),
            };
            let Some(caps) = CUE_TIMING_RE.captures(timing) else {
                warn!(line = line_no + 1, content = timing, "Malformed cue timing");
                return Err(CueKitError::MalformedCue {
                    line: line_no + 1,
                    content: timing.to_string(),
                });
            };

            let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            let malformed = || CueKitError::MalformedCue {
                line: line_no + 1,
                content: timing.to_string(),
            };
            let begin = convert_to_milliseconds([field(1), field(2), field(3), field(4)])
                .ok_or_else(malformed)?;
            let end = convert_to_milliseconds([field(5), field(6), field(7), field(8)])
                .ok_or_else(malformed)?;
            let position = field(9).trim().to_string();

            let mut text = Vec::new();
            for (_, line) in lines.by_ref() {
                if line.is_empty() {
                    break;
                }
                text.push(line);
            }

            track.add_cue(begin as f64, end as f64, text.join("\n"), position);
        }

        debug!(cues = track.len(), "Parsed WebVTT track");
        Ok(track)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n", HEADER)?;
        for (index, cue) in self.cues.iter().enumerate() {
            write!(f, "{}\n{}\n\n", index, cue)?;
        }
        Ok(())
    }
}

fn is_cue_index(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// `((hh * 3600) + (mm * 60) + ss) * 1000 + mmm`, or `None` if a field is
/// not a number.
pub fn convert_to_milliseconds(fields: [&str; 4]) -> Option<i64> {
    let [hh, mm, ss, mmm] = fields;
    let hh: i64 = hh.trim().parse().ok()?;
    let mm: i64 = mm.trim().parse().ok()?;
    let ss: i64 = ss.trim().parse().ok()?;
    let mmm: i64 = mmm.trim().parse().ok()?;
    Some((hh * 3600 + mm * 60 + ss) * 1000 + mmm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample() -> Track {
        let mut track = Track::new(TimeUnit::Milliseconds);
        track.add_cue(0.0, 1500.0, "Car\n<c.confidence>(90%)</c>", "align:center line:50% position:50% size:25%");
        track.add_cue(3_723_004.0, 3_724_000.0, "Tree", "");
        track
    }

    #[test]
    fn test_cue_format() {
        let cue = Cue::new(61_001.0, 62_010.0, "Hello", "align:start", TimeUnit::Milliseconds);
        assert_eq!(cue.to_string(), "00:01:01.001 --> 00:01:02.010 align:start\nHello");
        let bare = Cue::new(0.0, 5.0, "x", "", TimeUnit::Milliseconds);
        assert_eq!(bare.to_string(), "00:00:00.000 --> 00:00:00.005\nx");
    }

    #[test]
    fn test_cue_in_seconds() {
        let cue = Cue::new(1.5, 2.25, "s", "", TimeUnit::Seconds);
        assert_eq!(cue.begin_ms(), 1500);
        assert_eq!(cue.end_ms(), 2250);
        assert!(cue.to_string().starts_with("00:00:01.500 --> 00:00:02.250"));
    }

    #[test]
    fn test_empty_cue_is_widened() {
        let cue = Cue::new(1000.0, 1000.0, "x", "", TimeUnit::Milliseconds);
        assert_eq!(cue.end_ms(), 1100);
        let cue = Cue::new(2.0, 1.0, "x", "", TimeUnit::Seconds);
        assert_eq!(cue.end_ms(), 2100);
    }

    #[test]
    fn test_track_format() {
        assert_eq!(
            sample().to_string(),
            "WEBVTT\n\n\
             0\n00:00:00.000 --> 00:00:01.500 align:center line:50% position:50% size:25%\nCar\n<c.confidence>(90%)</c>\n\n\
             1\n01:02:03.004 --> 01:02:04.000\nTree\n\n"
        );
        assert_eq!(Track::default().to_string(), "WEBVTT\n\n");
    }

    #[test]
    fn test_round_trip() {
        let track = sample();
        let parsed = Track::parse(&track.to_string()).unwrap();
        assert_eq!(parsed, track);
    }

    #[test]
    fn test_whitespace_line_stays_in_cue_text() {
        let mut track = Track::new(TimeUnit::Milliseconds);
        track.add_cue(0.0, 1000.0, "a\n \nb", "");
        track.add_cue(2000.0, 3000.0, "c", "");
        let parsed = Track::parse(&track.to_string()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.cues()[0].text, "a\n \nb");
        assert_eq!(parsed, track);
    }

    #[test]
    fn test_round_trip_past_99_hours() {
        let mut track = Track::new(TimeUnit::Milliseconds);
        track.add_cue(360_000_000.0, 360_001_000.0, "late", "");
        let body = track.to_string();
        assert!(body.contains("100:00:00.000 --> 100:00:01.000"));
        assert_eq!(Track::parse(&body).unwrap(), track);
    }

    #[test]
    fn test_parse_crlf_and_missing_trailing_blank() {
        let body = "WEBVTT\r\n\r\n0\r\n00:00:01.000 --> 00:00:02.000\r\nline one\r\nline two";
        let track = Track::parse(body).unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].text, "line one\nline two");
        assert_eq!(track.cues()[0].position, "");
        assert_eq!(track.cues()[0].begin_ms(), 1000);
    }

    #[test]
    fn test_malformed_timing_fails_whole_track() {
        let body = "WEBVTT\n\n0\n00:00:01.000 --> 00:00:02.000\nok\n\n1\n00:00:03 --> 00:00:04\nbroken\n\n";
        let err = Track::parse(body).unwrap_err();
        assert_matches!(err, CueKitError::MalformedCue { line: 8, .. });
    }

    #[test]
    fn test_index_without_timing_fails() {
        let err = Track::parse("WEBVTT\n\n0").unwrap_err();
        assert_matches!(err, CueKitError::MalformedCue { line: 4, ref content } if content.is_empty());
    }

    #[test]
    fn test_mutation() {
        let mut track = sample();
        track.push(Cue::new(5.0, 6.0, "seconds", "", TimeUnit::Seconds));
        assert_eq!(track.len(), 3);
        assert_eq!(track.cues()[2].begin, 5000.0);

        assert_eq!(track.shift().map(|c| c.begin_ms()), Some(0));
        assert_eq!(track.pop().map(|c| c.text), Some("seconds".to_string()));
        track.truncate(0);
        assert!(track.is_empty());
        assert_eq!(track.shift(), None);
    }

    #[test]
    fn test_convert_to_milliseconds() {
        assert_eq!(convert_to_milliseconds(["01", "02", "03", "004"]), Some(3_723_004));
        assert_eq!(convert_to_milliseconds(["aa", "00", "00", "000"]), None);
    }
}
