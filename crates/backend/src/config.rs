//! Runtime configuration of the backend process

use eclips_core::port::HostEnvironment;
use std::path::{Path, PathBuf};

/// Overrides where the backend keeps its logs (tilde allowed)
pub const BACKEND_DIR_VAR: &str = "ECLIPS_BACKEND_DIR";

/// Name of the logger the backend installs as the process default
pub const LOGGER_NAME: &str = "backend";

/// Used when neither `ECLIPS_APP_NAME` nor `package.json` names the app
pub const DEFAULT_APP_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub backend_dir: PathBuf,
}

impl RuntimeConfig {
    /// Resolve the backend directory
    ///
    /// `ECLIPS_BACKEND_DIR` wins (relative paths are taken from `cwd`);
    /// otherwise `<cwd>/backend` if it exists, else `cwd` itself.
    pub fn from_env(env: &dyn HostEnvironment, cwd: &Path) -> Self {
        let backend_dir = match env.var(BACKEND_DIR_VAR).filter(|v| !v.is_empty()) {
            Some(raw) => {
                let expanded = shellexpand::tilde_with_context(&raw, || {
                    env.home_dir().map(|home| home.to_string_lossy().into_owned())
                });
                cwd.join(&*expanded)
            }
            None => {
                let nested = cwd.join("backend");
                if nested.is_dir() {
                    nested
                } else {
                    cwd.to_path_buf()
                }
            }
        };

        Self { backend_dir }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.backend_dir.join("logs")
    }

    /// `package.json` of the project the backend belongs to
    pub fn package_json(&self) -> PathBuf {
        self.backend_dir
            .parent()
            .unwrap_or(self.backend_dir.as_path())
            .join("package.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclips_core::domain::Platform;
    use eclips_core::port::host_env::mocks::FixedEnvironment;

    #[test]
    fn test_defaults_to_nested_backend_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("backend")).unwrap();
        let env = FixedEnvironment::new(Platform::Unix, None);

        let config = RuntimeConfig::from_env(&env, tmp.path());
        assert_eq!(config.backend_dir, tmp.path().join("backend"));
        assert_eq!(config.log_dir(), tmp.path().join("backend").join("logs"));
        assert_eq!(config.package_json(), tmp.path().join("package.json"));
    }

    #[test]
    fn test_falls_back_to_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        let env = FixedEnvironment::new(Platform::Unix, None);

        let config = RuntimeConfig::from_env(&env, tmp.path());
        assert_eq!(config.backend_dir, tmp.path());
    }

    #[test]
    fn test_env_override_expands_tilde() {
        let env = FixedEnvironment::new(Platform::Unix, Some(PathBuf::from("/home/dev")))
            .with_var(BACKEND_DIR_VAR, "~/project/backend");

        let config = RuntimeConfig::from_env(&env, Path::new("/tmp/elsewhere"));
        assert_eq!(config.backend_dir, PathBuf::from("/home/dev/project/backend"));
    }

    #[test]
    fn test_relative_override_is_joined_to_cwd() {
        let env = FixedEnvironment::new(Platform::Unix, None).with_var(BACKEND_DIR_VAR, "srv");

        let config = RuntimeConfig::from_env(&env, Path::new("/work"));
        assert_eq!(config.backend_dir, PathBuf::from("/work/srv"));
    }
}
