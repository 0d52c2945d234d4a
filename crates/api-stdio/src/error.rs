//! Bridge Error Types
//!
//! Everything that can go wrong with a single request line. All of these
//! become an error response; none of them stops the loop.

use eclips_core::domain::MethodError;
use std::error::Error as StdError;
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Request is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Malformed JSON request: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Request must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Method(#[from] MethodError),
}

/// Error report: the error followed by its cause chain
///
/// ```text
/// Invalid params for 'echo': missing field `message`
///
/// Caused by:
///     0: missing field `message`
/// ```
pub fn format_trace(err: &(dyn StdError + 'static)) -> String {
    let mut report = err.to_string();

    let mut source = err.source();
    if source.is_some() {
        report.push_str("\n\nCaused by:");
    }

    let mut index = 0;
    while let Some(cause) = source {
        let _ = write!(report, "\n    {}: {}", index, cause);
        index += 1;
        source = cause.source();
    }

    report
}
