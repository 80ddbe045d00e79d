//! Relabelling and deleting detections after the fact.
//!
//! An edit names a subject, the time ranges to move out of its track and what
//! to do with them. Cues whose begin falls inside a range move to a track of
//! their own with rewritten text, or are dropped when deleting. The rest stay
//! in the original track.

use std::sync::LazyLock;

use cuekit_core::{CueKitError, Result};
use cuekit_timeline::TimelineEntry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::webvtt::Track;

static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").expect("valid regex"));

/// What happens to the detections an edit selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    /// Move them under the new name.
    Apply,
    /// Remove them.
    Delete,
}

/// Inclusive range of begin times, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: i64,
    pub end_time: i64,
}

impl TimeRange {
    pub const fn new(start_time: i64, end_time: i64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    #[inline]
    pub fn contains(&self, ms: i64) -> bool {
        ms >= self.start_time && ms <= self.end_time
    }
}

/// A relabel or delete request against one subject's track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelEdit {
    /// Cue class of the track group, e.g. `celeb` or `label`.
    pub group: String,
    /// Name the selected detections are moved to.
    pub name: String,
    pub action: EditAction,
    pub ranges: Vec<TimeRange>,
}

impl LabelEdit {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        action: EditAction,
        ranges: Vec<TimeRange>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            action,
            ranges,
        }
    }

    /// Groups are letters only and the new name must not be empty.
    pub fn validate(&self) -> Result<()> {
        if !GROUP_RE.is_match(&self.group) {
            return Err(CueKitError::InvalidEdit(format!(
                "group {:?} must be letters only",
                self.group
            )));
        }
        if self.name.is_empty() {
            return Err(CueKitError::InvalidEdit("empty name".to_string()));
        }
        Ok(())
    }

    /// Text given to every moved cue.
    pub fn cue_text(&self) -> String {
        format!(
            "<c.{}>{}</c>\n<c.edited><i>(Edited)</i></c>",
            self.group, self.name
        )
    }
}

/// The two halves of an edited track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditedTrack {
    /// Cues left untouched.
    pub original: Track,
    /// Cues moved under the new name. Always empty for a delete.
    pub modified: Track,
}

impl Track {
    /// Split this track by an edit.
    ///
    /// Ranges are applied in order, each one scanning only the cues no
    /// earlier range has taken.
    pub fn apply_edit(self, edit: &LabelEdit) -> Result<EditedTrack> {
        edit.validate()?;
        let text = edit.cue_text();
        let mut original = self;
        let mut modified = Track::new(original.unit());

        for range in &edit.ranges {
            let mut rest = Track::new(original.unit());
            while let Some(mut cue) = original.shift() {
                if range.contains(cue.begin_ms()) {
                    cue.text = text.clone();
                    modified.push(cue);
                } else {
                    rest.push(cue);
                }
            }
            original = rest;
        }

        if edit.action == EditAction::Delete {
            modified.truncate(0);
        }

        debug!(
            action = ?edit.action,
            kept = original.len(),
            moved = modified.len(),
            "Applied label edit to track"
        );
        Ok(EditedTrack { original, modified })
    }
}

/// Split timeline metadata by an edit, like [`Track::apply_edit`].
///
/// Returns `(original, modified)`; moved entries keep their fields.
pub fn split_timeline_entries(
    entries: Vec<TimelineEntry>,
    edit: &LabelEdit,
) -> Result<(Vec<TimelineEntry>, Vec<TimelineEntry>)> {
    edit.validate()?;
    let mut original = entries;
    let mut modified = Vec::new();

    for range in &edit.ranges {
        let (taken, rest): (Vec<_>, Vec<_>) =
            original.into_iter().partition(|e| range.contains(e.begin));
        modified.extend(taken);
        original = rest;
    }

    if edit.action == EditAction::Delete {
        modified.clear();
    }
    Ok((original, modified))
}
