//! Stdio Bridge Layer
//!
//! Serves a `MethodProvider` over newline-delimited JSON on stdin/stdout.
//! One request line in, one response line out, strictly in order.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use error::{format_trace, BridgeError};
pub use handler::StdioHandler;
pub use server::{ServeSummary, StdioServer};
pub use types::{Request, Response};
