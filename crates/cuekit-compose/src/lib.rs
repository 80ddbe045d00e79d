//! CueKit Compose - Timed-text output
//!
//! Renders timelines and segments into text artifacts:
//! - WebVTT cue tracks, with a strict parser for reading them back
//! - CMX3600-style edit decision lists
//! - Shot and technical-cue tracks
//! - Relabelling and deleting cues of an existing track

pub mod edit;
pub mod edl;
pub mod segments;
pub mod webvtt;

pub use edit::{split_timeline_entries, EditAction, EditedTrack, LabelEdit, TimeRange};
pub use edl::{EdlComposer, EdlEvent};
pub use segments::{segments_to_edl, segments_to_track, CuePlacement};
pub use webvtt::{convert_to_milliseconds, Cue, TimeUnit, Track};
