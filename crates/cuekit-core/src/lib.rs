//! CueKit Core - Foundation types for timed-text composition
//!
//! This crate provides the fundamental types used throughout CueKit:
//! - Frame rates and broadcast timecode arithmetic (drop-frame, non-drop-frame)
//! - Wall-clock timestamps with millisecond precision
//! - Normalized bounding boxes for detection geometry
//! - The shared error type

pub mod error;
pub mod geometry;
pub mod timecode;

pub use error::{CueKitError, Result};
pub use geometry::BoundingBox;
pub use timecode::{FrameRate, Timecode, TimecodeConverter, Timestamp};
