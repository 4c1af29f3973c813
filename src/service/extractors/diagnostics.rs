// Extraction error diagnostics - maps yt-dlp failure text to error kinds
//
// yt-dlp only reports failures as free text on stderr, so classification is
// substring based. All matching rules live here.

use lazy_static::lazy_static;
use regex::Regex;

use crate::service::errors::{ErrorKind, ExtractError};

lazy_static! {
    /// Checked in order, first match wins
    static ref RULES: Vec<(Regex, ErrorKind)> = vec![
        (Regex::new(r"Private video").unwrap(), ErrorKind::VideoPrivate),
        (Regex::new(r"Video unavailable").unwrap(), ErrorKind::VideoUnavailable),
        (Regex::new(r"(?i)\bage\b").unwrap(), ErrorKind::VideoAge),
        (Regex::new(r"available in your country").unwrap(), ErrorKind::VideoRegion),
    ];
}

/// Classify an extraction failure message. Unrecognized text is `fetch.fail`.
pub fn classify_error_message(message: &str) -> ErrorKind {
    RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(message))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::FetchFail)
}

/// Classify an error returned by an extraction invoker
pub fn classify_extraction_error(error: &ExtractError) -> ErrorKind {
    classify_error_message(error.message())
}
