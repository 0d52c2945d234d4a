// Storage Use Case - per-user application data directory

use crate::domain::Platform;
use crate::error::{AppError, Result};
use crate::port::HostEnvironment;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Windows variable holding the roaming application-data root
pub const APPDATA_VAR: &str = "APPDATA";

/// Overrides the application name read from `package.json`
pub const APP_NAME_VAR: &str = "ECLIPS_APP_NAME";

/// Platform application-data root, without the application name
///
/// - Windows: `%APPDATA%`
/// - macOS: `~/Library/Application Support`
/// - other: `~/.local/share`
pub fn app_data_root(env: &dyn HostEnvironment) -> Result<PathBuf> {
    match env.platform() {
        Platform::Windows => env
            .var(APPDATA_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| AppError::Config(format!("{} is not set", APPDATA_VAR))),
        Platform::MacOs => Ok(home(env)?.join("Library").join("Application Support")),
        Platform::Unix => Ok(home(env)?.join(".local").join("share")),
    }
}

/// Application data directory, created if missing
///
/// Idempotent: an existing directory is not an error.
pub fn app_data_dir(env: &dyn HostEnvironment, app_name: &str) -> Result<PathBuf> {
    validate_app_name(app_name)?;

    let path = app_data_root(env)?.join(app_name);
    std::fs::create_dir_all(&path)?;

    debug!(path = %path.display(), "Application data directory ready");
    Ok(path)
}

/// Application name from `ECLIPS_APP_NAME`, then `package.json`, then `fallback`
pub fn resolve_app_name(
    env: &dyn HostEnvironment,
    package_json: &Path,
    fallback: &str,
) -> Result<String> {
    if let Some(name) = env.var(APP_NAME_VAR).filter(|n| !n.is_empty()) {
        return Ok(name);
    }

    if package_json.is_file() {
        let raw = std::fs::read_to_string(package_json)?;
        let manifest: serde_json::Value = serde_json::from_str(&raw)?;
        return manifest
            .get("name")
            .and_then(|n| n.as_str())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "{} has no \"name\" field",
                    package_json.display()
                ))
            });
    }

    Ok(fallback.to_string())
}

fn home(env: &dyn HostEnvironment) -> Result<PathBuf> {
    env.home_dir()
        .ok_or_else(|| AppError::Config("home directory could not be determined".to_string()))
}

fn validate_app_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::Validation("app name cannot be empty".to_string()));
    }

    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(AppError::Validation(format!(
            "app name '{}' must be a single path component",
            name
        )));
    }

    Ok(())
}
