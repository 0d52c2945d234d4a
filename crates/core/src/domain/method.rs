// Method Domain Model - errors and params shared by every backend method

use serde::Deserialize;
use thiserror::Error;

/// Error type returned by method handlers
///
/// Boxed so handlers can use `?` on any error type.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Per-request method failures
///
/// Every variant is reported back to the caller as an error response;
/// none of them ends the bridge loop.
#[derive(Error, Debug)]
pub enum MethodError {
    #[error("Method '{0}' not found")]
    NotFound(String),

    #[error("Invalid params for '{method}': {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Result of '{method}' is not serializable: {source}")]
    InvalidResult {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Method '{method}' panicked: {message}")]
    Panicked { method: String, message: String },

    /// Error raised by the handler itself
    #[error(transparent)]
    Failed(HandlerError),
}

impl MethodError {
    /// Wrap a handler-raised error
    pub fn failed(err: impl Into<HandlerError>) -> Self {
        MethodError::Failed(err.into())
    }
}

/// Params type for methods that take no arguments
///
/// Accepts only an empty object; any extra key is rejected.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}
