//! Build Pipeline Integration Tests
//!
//! Project config from disk, layout on disk, packaging tools replaced by a
//! recording runner.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use eclips_core::application::Builder;
use eclips_core::domain::{BuildLayout, Platform};
use eclips_core::error::AppError;
use eclips_core::port::command_runner::mocks::{MockBehavior, RecordingRunner};
use eclips_core::port::CommandSpec;
use eclips_infra_system::load_build_config;

fn scaffold_project(root: &Path, config: Option<&str>) -> BuildLayout {
    let layout = BuildLayout::new(root);
    fs::create_dir_all(layout.backend.join("helper")).unwrap();
    fs::write(layout.runtime_entry(), "print('runtime')\n").unwrap();
    fs::write(layout.package_json(), r#"{"name": "demo"}"#).unwrap();
    if let Some(config) = config {
        fs::write(layout.config_path(), config).unwrap();
    }
    layout
}

/// Pretend to be PyInstaller: create the executable named by --distpath
fn fake_freeze(spec: &CommandSpec) {
    if let Some(pos) = spec.args.iter().position(|a| a == "--distpath") {
        let dist = Path::new(&spec.args[pos + 1]);
        fs::create_dir_all(dist).unwrap();
        fs::write(dist.join("app"), b"frozen").unwrap();
    }
}

fn hidden_imports_of(spec: &CommandSpec) -> Vec<String> {
    spec.args
        .windows(2)
        .filter(|w| w[0] == "--hidden-import")
        .map(|w| w[1].clone())
        .collect()
}

#[tokio::test]
async fn test_fresh_build_with_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = scaffold_project(tmp.path(), Some(r#"{"hidden_imports": ["foo", "queue"]}"#));
    fs::create_dir_all(layout.release.join("old")).unwrap();
    fs::create_dir_all(layout.logs_dir()).unwrap();

    let config = load_build_config(&layout.config_path()).unwrap();
    let runner = Arc::new(RecordingRunner::new().with_side_effect(fake_freeze));
    let builder = Builder::new(layout.clone(), config, runner.clone(), Platform::Unix);

    let report = builder.run().await.unwrap();

    assert!(!report.reused_executable);
    assert_eq!(report.frozen_executable, layout.dist.join("app"));
    assert!(!layout.release.join("old").exists());
    assert!(!layout.logs_dir().exists());

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, "python3");
    assert_eq!(calls[1].program, "npx");
    assert_eq!(calls[1].args, vec!["electron-builder".to_string()]);

    let hidden = hidden_imports_of(&calls[0]);
    assert_eq!(
        hidden,
        vec![
            "encodings",
            "foo",
            "importlib",
            "inspect",
            "logging.handlers",
            "pkgutil",
            "queue"
        ]
    );
    assert_eq!(report.hidden_imports, Some(hidden));
}

#[tokio::test]
async fn test_second_build_reuses_executable() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = scaffold_project(tmp.path(), None);
    fs::create_dir_all(&layout.dist).unwrap();
    fs::write(layout.dist.join("app"), b"frozen").unwrap();

    let config = load_build_config(&layout.config_path()).unwrap();
    let runner = Arc::new(RecordingRunner::new());
    let builder = Builder::new(layout.clone(), config, runner.clone(), Platform::Unix);

    let report = builder.run().await.unwrap();

    assert!(report.reused_executable);
    assert_eq!(report.hidden_imports, None);
    assert_eq!(fs::read(layout.dist.join("app")).unwrap(), b"frozen");

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "npx");
}

#[tokio::test]
async fn test_python_override_from_config() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = scaffold_project(tmp.path(), Some(r#"{"python": "/opt/py/bin/python"}"#));

    let config = load_build_config(&layout.config_path()).unwrap();
    let runner = Arc::new(RecordingRunner::new().with_side_effect(fake_freeze));
    let builder = Builder::new(layout, config, runner.clone(), Platform::Unix);

    builder.run().await.unwrap();
    assert_eq!(runner.calls()[0].program, "/opt/py/bin/python");
}

#[tokio::test]
async fn test_failed_freeze_skips_installer() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = scaffold_project(tmp.path(), None);

    let config = load_build_config(&layout.config_path()).unwrap();
    let runner = Arc::new(
        RecordingRunner::new().with_behavior("python3", MockBehavior::ExitCode(1)),
    );
    let builder = Builder::new(layout, config, runner.clone(), Platform::Unix);

    let err = builder.run().await.unwrap_err();
    assert!(matches!(err, AppError::Build(_)));
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_malformed_config_fails_before_any_command() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = scaffold_project(tmp.path(), Some(r#"{"hidden_imports": "queue"}"#));

    let result = load_build_config(&layout.config_path());
    assert!(matches!(result, Err(AppError::Config(_))));
}
