// Build Domain Model - project layout and packaging configuration

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::Platform;

/// Hidden imports the freeze step always needs, whatever the project config says
pub const BASELINE_HIDDEN_IMPORTS: &[&str] = &[
    "logging.handlers",
    "encodings",
    "queue",
    "importlib",
    "inspect",
    "pkgutil",
];

/// Name of the optional per-project config file (inside `backend/`)
pub const CONFIG_FILE_NAME: &str = "eclips.config.json";

/// Base name of the frozen backend executable
pub const FROZEN_EXE_STEM: &str = "app";

/// `eclips.config.json` contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Extra modules passed to the freeze tool as `--hidden-import`
    pub hidden_imports: Vec<String>,
    /// Interpreter used to run the freeze tool
    pub python: Option<String>,
}

impl BuildConfig {
    /// Baseline and configured imports merged, deduplicated and sorted
    pub fn resolved_hidden_imports(&self) -> Vec<String> {
        resolve_hidden_imports(&self.hidden_imports)
    }

    /// Interpreter to invoke, falling back to the platform default
    pub fn python_for(&self, platform: Platform) -> String {
        match &self.python {
            Some(python) => python.clone(),
            None if platform == Platform::Windows => "python".to_string(),
            None => "python3".to_string(),
        }
    }
}

/// Union of [`BASELINE_HIDDEN_IMPORTS`] and `configured`, sorted for determinism
pub fn resolve_hidden_imports(configured: &[String]) -> Vec<String> {
    BASELINE_HIDDEN_IMPORTS
        .iter()
        .map(|module| module.to_string())
        .chain(configured.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fixed directory layout of a scaffolded project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    pub root: PathBuf,
    pub backend: PathBuf,
    pub dist: PathBuf,
    pub release: PathBuf,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            backend: root.join("backend"),
            dist: root.join("dist"),
            release: root.join("release"),
            root,
        }
    }

    /// Optional project config
    pub fn config_path(&self) -> PathBuf {
        self.backend.join(CONFIG_FILE_NAME)
    }

    /// Runtime log directory, wiped by every clean
    pub fn logs_dir(&self) -> PathBuf {
        self.backend.join("logs")
    }

    /// Script the freeze tool starts from
    pub fn runtime_entry(&self) -> PathBuf {
        self.backend.join("helper").join("runtime.py")
    }

    /// Path of the frozen executable for `platform`
    pub fn frozen_executable(&self, platform: Platform) -> PathBuf {
        self.dist
            .join(format!("{}{}", FROZEN_EXE_STEM, platform.exe_suffix()))
    }

    /// `package.json` at the project root
    pub fn package_json(&self) -> PathBuf {
        self.root.join("package.json")
    }
}
