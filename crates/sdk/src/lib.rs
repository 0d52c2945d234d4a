//! Eclips SDK - Rust Client Library
//!
//! The front-end side of the stdio bridge: starts a backend process, sends
//! `{id, method, params}` lines and hands every caller its own response.
//!
//! # Example
//!
//! ```no_run
//! use eclips_sdk::{BackendClient, BackendCommand};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Start the frozen backend
//!     let client = BackendClient::spawn(BackendCommand::new("./dist/app"))?;
//!
//!     // Call a method
//!     let echoed = client.call("echo", json!({"message": "hello"})).await?;
//!     println!("Backend said: {}", echoed);
//!
//!     client.shutdown(Duration::from_secs(3)).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::BackendClient;
pub use error::{Result, SdkError};
pub use types::BackendCommand;
