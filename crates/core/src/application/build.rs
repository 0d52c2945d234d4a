// Build Use Case - freeze the backend, then wrap it in a desktop installer

use crate::domain::{BuildConfig, BuildLayout, Platform};
use crate::error::{AppError, Result};
use crate::port::{CommandRunner, CommandSpec, ExecutionStatus};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// How much of the previous build output to remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMode {
    /// Release artifacts and logs only; keeps the frozen executable
    Partial,
    /// Everything, including `dist/` (recreated empty)
    Full,
}

/// Outcome of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub frozen_executable: PathBuf,
    /// True when an existing executable was reused instead of rebuilt
    pub reused_executable: bool,
    /// Hidden imports passed to the freeze step (`None` when it was skipped)
    pub hidden_imports: Option<Vec<String>>,
    pub release_dir: PathBuf,
}

/// Production build pipeline
///
/// Steps run strictly in order; the first failing step aborts the build.
pub struct Builder {
    layout: BuildLayout,
    config: BuildConfig,
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
}

impl Builder {
    pub fn new(
        layout: BuildLayout,
        config: BuildConfig,
        runner: Arc<dyn CommandRunner>,
        platform: Platform,
    ) -> Self {
        Self {
            layout,
            config,
            runner,
            platform,
        }
    }

    /// Run the whole pipeline
    ///
    /// An existing frozen executable acts as a cache: the freeze step is
    /// skipped and only a partial clean is done.
    pub async fn run(&self) -> Result<BuildReport> {
        info!(root = %self.layout.root.display(), "Starting production build");

        let exe = self.layout.frozen_executable(self.platform);
        let reused_executable = exe.exists();

        let hidden_imports = if reused_executable {
            info!(exe = %exe.display(), "Frozen executable already exists, skipping freeze step");
            self.clean(CleanMode::Partial)?;
            None
        } else {
            info!(exe = %exe.display(), "Frozen executable not found, building backend");
            self.clean(CleanMode::Full)?;
            Some(self.freeze().await?)
        };

        self.package().await?;

        info!(release = %self.layout.release.display(), "Build succeeded");

        Ok(BuildReport {
            frozen_executable: exe,
            reused_executable,
            hidden_imports,
            release_dir: self.layout.release.clone(),
        })
    }

    /// Remove previous build output
    pub fn clean(&self, mode: CleanMode) -> Result<()> {
        info!(mode = ?mode, "Cleaning previous builds");

        remove_dir_if_exists(&self.layout.release)?;
        remove_dir_if_exists(&self.layout.logs_dir())?;

        if mode == CleanMode::Full {
            remove_dir_if_exists(&self.layout.dist)?;
            std::fs::create_dir_all(&self.layout.dist)?;
        }

        Ok(())
    }

    /// PyInstaller invocation producing `dist/app[.exe]`
    pub fn freeze_command(&self, hidden_imports: &[String]) -> CommandSpec {
        let add_data = format!(
            "{}{}backend",
            self.layout.backend.display(),
            self.platform.path_list_separator()
        );

        let mut spec = CommandSpec::new(self.config.python_for(self.platform)).args([
            "-m".to_string(),
            "PyInstaller".to_string(),
            "--onefile".to_string(),
            "--name".to_string(),
            crate::domain::build::FROZEN_EXE_STEM.to_string(),
            "--distpath".to_string(),
            self.layout.dist.display().to_string(),
            "--add-data".to_string(),
            add_data,
        ]);

        for module in hidden_imports {
            spec = spec.arg("--hidden-import").arg(module.clone());
        }

        spec.args([
            "--clean".to_string(),
            "--noconfirm".to_string(),
            self.layout.runtime_entry().display().to_string(),
        ])
        .current_dir(&self.layout.root)
    }

    /// electron-builder invocation producing the installer under `release/`
    pub fn installer_command(&self) -> CommandSpec {
        let spec = match self.platform {
            // npx is a .cmd shim on Windows and needs a shell
            Platform::Windows => CommandSpec::new("cmd").args(["/C", "npx", "electron-builder"]),
            Platform::MacOs | Platform::Unix => {
                CommandSpec::new("npx").arg("electron-builder")
            }
        };
        spec.current_dir(&self.layout.root)
    }

    async fn freeze(&self) -> Result<Vec<String>> {
        let hidden_imports = self.config.resolved_hidden_imports();
        info!(hidden_imports = ?hidden_imports, "Freezing backend");

        self.run_checked(&self.freeze_command(&hidden_imports))
            .await?;

        let exe = self.layout.frozen_executable(self.platform);
        if !exe.exists() {
            return Err(AppError::Build(format!(
                "backend freeze reported success but {} was not produced",
                exe.display()
            )));
        }

        info!(exe = %exe.display(), "Backend freeze complete");
        Ok(hidden_imports)
    }

    async fn package(&self) -> Result<()> {
        info!("Building desktop installer");
        self.run_checked(&self.installer_command()).await?;
        info!("Desktop installer build complete");
        Ok(())
    }

    async fn run_checked(&self, spec: &CommandSpec) -> Result<()> {
        let result = self.runner.run(spec).await?;

        if result.status != ExecutionStatus::Success {
            return Err(AppError::Build(format!(
                "`{}` exited with code {}",
                spec,
                result
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none (terminated by signal)".to_string())
            )));
        }

        Ok(())
    }
}

/// `remove_dir_all` that treats a missing directory as already clean
fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove directory");
            Err(e.into())
        }
    }
}
