//! CMX3600-style edit decision lists.
//!
//! Every event is a straight cut on the video track whose record times equal
//! its source times.

use cuekit_core::TimecodeConverter;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MAX_TITLE_CHARS: usize = 70;
const MAX_REEL_CHARS: usize = 8;

/// One edit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdlEvent {
    pub reel_name: String,
    pub clip_name: String,
    /// SMPTE timecode, `;` before the frames field for drop frame.
    pub start_time: String,
    pub end_time: String,
}

impl EdlEvent {
    pub fn new(
        reel_name: impl Into<String>,
        clip_name: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            reel_name: reel_name.into(),
            clip_name: clip_name.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// Event spanning two frame numbers, labelled by `converter`.
    pub fn from_frames(
        converter: &TimecodeConverter,
        reel_name: impl Into<String>,
        clip_name: impl Into<String>,
        start_frame: i64,
        end_frame: i64,
    ) -> Self {
        Self::new(
            reel_name,
            clip_name,
            converter.format_timecode(start_frame),
            converter.format_timecode(end_frame),
        )
    }
}

/// Renders a titled list of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdlComposer {
    title: String,
    events: Vec<EdlEvent>,
}

impl EdlComposer {
    pub fn new(title: impl Into<String>, events: Vec<EdlEvent>) -> Self {
        Self {
            title: title.into(),
            events,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn events(&self) -> &[EdlEvent] {
        &self.events
    }

    /// Whether the list is drop frame, judged from the first event's start.
    pub fn drop_frame(&self) -> bool {
        self.events
            .first()
            .and_then(|e| e.start_time.find(';'))
            .is_some_and(|i| i > 0)
    }

    /// Header, then one block per event, each followed by a blank line.
    pub fn compose(&self) -> String {
        let fcm = if self.drop_frame() {
            "DROP FRAME"
        } else {
            "NON-DROP FRAME"
        };

        let mut lines = vec![
            format!("TITLE: {}", sanitize_title(&self.title)),
            format!("FCM: {}", fcm),
            String::new(),
        ];
        for (i, event) in self.events.iter().enumerate() {
            let src_in = event.start_time.replacen(';', ":", 1);
            let src_out = event.end_time.replacen(';', ":", 1);
            lines.push(format!(
                "{:03}  {}  V     C     {} {} {} {}",
                i + 1,
                reel_name(&event.reel_name),
                src_in,
                src_out,
                src_in,
                src_out
            ));
            lines.push(format!("* FROM CLIP NAME: {}", event.clip_name));
            lines.push(String::new());
        }
        lines.push(String::new());

        debug!(events = self.events.len(), drop_frame = self.drop_frame(), "Composed EDL");
        lines.join("\n")
    }
}

/// Uppercase; anything but letters, digits, whitespace, `:`, `\` and `/`
/// becomes a space; at most 70 characters.
fn sanitize_title(title: &str) -> String {
    title
        .to_uppercase()
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase()
                || c.is_ascii_digit()
                || c.is_whitespace()
                || matches!(c, ':' | '\\' | '/')
            {
                c
            } else {
                ' '
            }
        })
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// Uppercase alphanumerics only, keeping the last 8.
fn reel_name(name: &str) -> String {
    let reel: Vec<char> = name
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    let skip = reel.len().saturating_sub(MAX_REEL_CHARS);
    reel[skip..].iter().collect()
}
