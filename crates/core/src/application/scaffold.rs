// Scaffold Use Case - create a new project from a template directory

use crate::error::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PACKAGE_JSON: &str = "package.json";

/// Copy `template` to `<parent>/<name>` and stamp `name` into its `package.json`
///
/// # Errors
/// - AppError::Validation if `name` is empty or not a single path component
/// - AppError::Conflict if the target directory already exists
/// - AppError::NotFound if the template or its `package.json` is missing
pub fn create_project(template: &Path, parent: &Path, name: &str) -> Result<PathBuf> {
    validate_project_name(name)?;

    if !template.is_dir() {
        return Err(AppError::NotFound(format!(
            "template directory {}",
            template.display()
        )));
    }

    if !template.join(PACKAGE_JSON).is_file() {
        return Err(AppError::NotFound(format!(
            "{} in template {}",
            PACKAGE_JSON,
            template.display()
        )));
    }

    let target = parent.join(name);
    if target.exists() {
        return Err(AppError::Conflict(format!(
            "folder \"{}\" already exists",
            name
        )));
    }

    info!(template = %template.display(), target = %target.display(), "Creating project");

    copy_dir_recursive(template, &target)?;
    patch_package_name(&target.join(PACKAGE_JSON), name)?;

    Ok(target)
}

/// Rewrite the `name` field, keeping every other key in place
fn patch_package_name(path: &Path, name: &str) -> Result<()> {
    let raw = fs::read_to_string(path)?;
    let mut manifest: serde_json::Value = serde_json::from_str(&raw)?;

    let object = manifest.as_object_mut().ok_or_else(|| {
        AppError::Validation(format!("{} is not a JSON object", path.display()))
    })?;
    object.insert(
        "name".to_string(),
        serde_json::Value::String(name.to_string()),
    );

    fs::write(path, serde_json::to_string_pretty(&manifest)?)?;
    debug!(path = %path.display(), name = %name, "Patched package name");
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }

    Ok(())
}

fn validate_project_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "please provide a project name".to_string(),
        ));
    }

    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(AppError::Validation(format!(
            "project name '{}' must be a single path component",
            name
        )));
    }

    Ok(())
}
