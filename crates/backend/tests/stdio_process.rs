//! End-to-end tests against the real `app` binary over piped stdio

#![cfg(unix)]

use eclips_sdk::{BackendClient, BackendCommand, SdkError};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

fn backend_command(root: &Path) -> BackendCommand {
    BackendCommand::new(env!("CARGO_BIN_EXE_app"))
        .env("ECLIPS_BACKEND_DIR", root.join("backend").to_string_lossy())
        .env("ECLIPS_APP_NAME", "process-test-app")
        .env("HOME", root.join("home").to_string_lossy())
        .current_dir(root)
}

#[tokio::test]
async fn test_backend_process_answers_and_exits_on_eof() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("home")).unwrap();

    let client = BackendClient::spawn(backend_command(tmp.path())).unwrap();

    let pong = client.call("ping", json!({})).await.unwrap();
    assert_eq!(pong, json!("pong"));

    let echoed = client
        .call("echo", json!({"message": "über"}))
        .await
        .unwrap();
    assert_eq!(echoed, json!("über"));

    let info = client.call("app.info", json!({})).await.unwrap();
    assert_eq!(info["name"], json!("process-test-app"));
    let data_dir = info["data_dir"].as_str().unwrap();
    assert!(Path::new(data_dir).is_dir());
    assert!(data_dir.ends_with("process-test-app"));

    match client.call("missing", json!({})).await {
        Err(SdkError::Backend { message, .. }) => {
            assert_eq!(message, "Method 'missing' not found")
        }
        other => panic!("expected backend error, got {:?}", other),
    }

    let status = client.shutdown(Duration::from_secs(10)).await.unwrap();
    assert!(status.unwrap().success());

    let log = std::fs::read_to_string(tmp.path().join("backend/logs/backend.log")).unwrap();
    assert!(log.contains("[INFO] backend - Eclips backend starting"));
    assert!(log.contains("Input closed, bridge loop finished"));
}

#[tokio::test]
async fn test_invalid_params_do_not_stop_the_backend() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("home")).unwrap();

    let client = BackendClient::spawn(backend_command(tmp.path())).unwrap();

    let err = client.call("echo", json!({"msg": 1})).await.unwrap_err();
    match err {
        SdkError::Backend { message, trace, .. } => {
            assert!(message.starts_with("Invalid params for 'echo'"));
            assert!(trace.contains("Caused by:"));
        }
        other => panic!("expected backend error, got {:?}", other),
    }

    assert_eq!(client.call("ping", json!({})).await.unwrap(), json!("pong"));

    client.shutdown(Duration::from_secs(10)).await.unwrap();
}
