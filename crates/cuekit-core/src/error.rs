//! Error types for CueKit.

use thiserror::Error;

/// Main error type for CueKit operations.
#[derive(Error, Debug)]
pub enum CueKitError {
    /// A detection record carried none of the recognized marker fields.
    #[error("fail to create typed item")]
    UnrecognizedRecord,

    #[error("Malformed detection record: {0}")]
    MalformedRecord(String),

    #[error("{0} not supported")]
    UnsupportedFrameRate(String),

    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    /// A WebVTT timecode line did not match the expected cue timing form.
    #[error("Malformed cue at line {line}: {content:?}")]
    MalformedCue { line: usize, content: String },

    #[error("Invalid label edit: {0}")]
    InvalidEdit(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for CueKit operations.
pub type Result<T> = std::result::Result<T, CueKitError>;
