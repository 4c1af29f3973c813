// Error types for the format selector
//
// Every failure leaves the service as a flat, string-tagged kind. The wire
// shape is `{ "error": "<kind>", "critical": true }` with `critical` omitted
// unless set.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Stable error codes returned to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Extraction tool reported a private video
    VideoPrivate,

    /// Video deleted, removed, or otherwise unavailable
    VideoUnavailable,

    /// Age-gated content
    VideoAge,

    /// Not available in the caller's region
    VideoRegion,

    /// Live streams cannot be packaged
    VideoLive,

    /// Duration exceeds the configured limit
    TooLong,

    /// Generic fetch failure (tool error, bad JSON, id mismatch)
    FetchFail,

    /// No format survived filtering
    NoMatchingFormat,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoPrivate => "content.video.private",
            Self::VideoUnavailable => "content.video.unavailable",
            Self::VideoAge => "content.video.age",
            Self::VideoRegion => "content.video.region",
            Self::VideoLive => "content.video.live",
            Self::TooLong => "content.too_long",
            Self::FetchFail => "fetch.fail",
            Self::NoMatchingFormat => "youtube.no_matching_format",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Error value produced by a failed selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionError {
    pub kind: ErrorKind,

    /// Set when retrying the same request would hit the same data mismatch
    pub critical: bool,
}

impl SelectionError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            critical: false,
        }
    }

    pub fn critical(kind: ErrorKind) -> Self {
        Self {
            kind,
            critical: true,
        }
    }
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.critical {
            write!(f, "{} (critical)", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl std::error::Error for SelectionError {}

impl From<ErrorKind> for SelectionError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl Serialize for SelectionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.critical { 2 } else { 1 };
        let mut state = serializer.serialize_struct("SelectionError", len)?;
        state.serialize_field("error", &self.kind)?;
        if self.critical {
            state.serialize_field("critical", &true)?;
        }
        state.end()
    }
}

/// Failures raised by an extraction invoker
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    /// The tool ran and reported an error on stderr
    #[error("{0}")]
    Tool(String),

    /// The tool could not be started, waited on, or timed out
    #[error("Execution error: {0}")]
    Execution(String),

    /// The tool binary is missing
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
}

impl ExtractError {
    /// Text used for error classification
    pub fn message(&self) -> &str {
        match self {
            Self::Tool(msg) | Self::Execution(msg) | Self::ToolNotFound(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_error_omits_critical() {
        let err = SelectionError::new(ErrorKind::NoMatchingFormat);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "youtube.no_matching_format" }));
    }

    #[test]
    fn test_critical_error_shape() {
        let err = SelectionError::critical(ErrorKind::FetchFail);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "fetch.fail", "critical": true }));
        assert_eq!(err.to_string(), "fetch.fail (critical)");
    }

    #[test]
    fn test_selection_error_as_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(SelectionError::new(ErrorKind::VideoLive));
        assert_eq!(err.to_string(), ErrorKind::VideoLive.as_str());
        assert!(err.source().is_none());
    }
}
