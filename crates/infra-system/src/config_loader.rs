// Project config loading (eclips.config.json)

use config::{Config, ConfigError, File, FileFormat, Value, ValueKind};
use eclips_core::domain::BuildConfig;
use eclips_core::error::{AppError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Load `eclips.config.json`; a missing file yields the defaults
///
/// # Errors
/// - AppError::Config if the file is not valid JSON or a key has the wrong
///   shape (e.g. `hidden_imports` is not a list of strings)
pub fn load_build_config(path: &Path) -> Result<BuildConfig> {
    if !path.is_file() {
        debug!(path = %path.display(), "No project config, using defaults");
        return Ok(BuildConfig::default());
    }

    info!(path = %path.display(), "Loading project config");

    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Json).required(true))
        .build()
        .map_err(|e| config_error(path, e))?;

    let hidden_imports = match settings.get_array("hidden_imports") {
        Ok(values) => values
            .into_iter()
            .map(|value| expect_string(path, "hidden_imports entry", value))
            .collect::<Result<Vec<_>>>()?,
        Err(ConfigError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(config_error(path, e)),
    };

    let python = match settings.get::<Value>("python") {
        Ok(value) => Some(expect_string(path, "python", value)?),
        Err(ConfigError::NotFound(_)) => None,
        Err(e) => return Err(config_error(path, e)),
    };

    let config = BuildConfig {
        hidden_imports,
        python,
    };

    info!(hidden_imports = ?config.hidden_imports, "Project config loaded");
    Ok(config)
}

// Values must already be JSON strings; config would otherwise coerce
// numbers and booleans into their string form.
fn expect_string(path: &Path, key: &str, value: Value) -> Result<String> {
    match value.kind {
        ValueKind::String(s) => Ok(s),
        other => Err(config_error(
            path,
            format!("{} must be a string, found {}", key, other),
        )),
    }
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> AppError {
    AppError::Config(format!("{}: {}", path.display(), err))
}
