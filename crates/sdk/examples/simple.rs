//! Simple SDK Example
//!
//! Starts a backend, calls its built-in methods and stops it.
//!
//! # Usage
//!
//! ```bash
//! cargo build --package eclips-backend
//! cargo run --package eclips-sdk --example simple -- target/debug/app
//! ```

use eclips_sdk::{BackendClient, BackendCommand, SdkError};
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let program = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./dist/app".to_string());

    println!("Eclips SDK - Simple Example");
    println!("===========================\n");

    // 1. Start the backend
    println!("1. Starting {}...", program);
    let client = BackendClient::spawn(BackendCommand::new(&program))?;
    println!("   ✓ Started\n");

    // 2. ping
    let pong = client.call("ping", json!({})).await?;
    println!("2. ping -> {}\n", pong);

    // 3. echo
    let echoed = client.call("echo", json!({"message": "hello"})).await?;
    println!("3. echo -> {}\n", echoed);

    // 4. app.info
    let info = client.call("app.info", json!({})).await?;
    println!("4. app.info -> {}\n", serde_json::to_string_pretty(&info)?);

    // 5. An unknown method comes back as an error payload
    match client.call("missing", json!({})).await {
        Err(SdkError::Backend { message, .. }) => println!("5. missing -> error: {}\n", message),
        other => println!("5. missing -> unexpected: {:?}\n", other),
    }

    // 6. Stop it
    let status = client.shutdown(Duration::from_secs(3)).await?;
    println!("6. Backend exited: {:?}", status);

    Ok(())
}
