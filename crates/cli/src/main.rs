//! Eclips CLI - create, build and talk to Eclips desktop projects

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eclips_core::application::scaffold::create_project;
use eclips_core::application::storage::{app_data_dir, resolve_app_name};
use eclips_core::application::Builder;
use eclips_core::domain::{BuildLayout, Platform};
use eclips_core::port::HostEnvironment;
use eclips_infra_system::{load_build_config, SubprocessRunner, SystemEnvironment};
use eclips_sdk::{BackendClient, BackendCommand, SdkError};

/// Bundled template, relative to an install prefix
const BUNDLED_TEMPLATE: &str = "templates/default";
const DEFAULT_APP_NAME: &str = "eclips-app";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[derive(Parser, Debug)]
#[command(name = "eclips")]
#[command(about = "Eclips desktop app toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new project from a template
    Create {
        /// Project (and folder) name
        name: String,

        /// Template directory to copy (default: the bundled templates/default)
        #[arg(long, env = "ECLIPS_TEMPLATE_DIR")]
        template: Option<PathBuf>,
    },

    /// Freeze the backend and build the installer
    Build {
        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Print (and create) the application data directory
    DataDir {
        /// Application name (default: package.json name)
        #[arg(long)]
        app_name: Option<String>,
    },

    /// Call one backend method and print the result
    Call {
        /// Method name (e.g. ping, echo, app.info)
        method: String,

        /// Params as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,

        /// Backend executable (default: the frozen dist/app)
        #[arg(long, env = "ECLIPS_BACKEND")]
        backend: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("eclips=info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Create { name, template } => {
            let template = match template {
                Some(template) => template,
                None => {
                    let exe = std::env::current_exe()
                        .context("Failed to locate the eclips executable")?;
                    find_template(&template_candidates(&exe))?
                }
            };

            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            let target = create_project(&template, &cwd, &name)
                .with_context(|| format!("Failed to create project \"{}\"", name))?;

            println!(
                "{}",
                format!("✓ Project \"{}\" created", name).green().bold()
            );
            println!();
            println!("  cd {}", target.display());
            println!("  npm install");
        }

        Commands::Build { root } => {
            let layout = BuildLayout::new(root);
            let config = load_build_config(&layout.config_path())?;
            let builder = Builder::new(
                layout,
                config,
                Arc::new(SubprocessRunner::new()),
                Platform::current(),
            );

            println!("{}", "Building...".cyan().bold());
            let report = builder.run().await.context("Build failed")?;

            println!("{}", "✓ Build succeeded".green().bold());
            println!();
            if report.reused_executable {
                println!("  {} {} (reused)", "Backend:".bold(), report.frozen_executable.display());
            } else {
                println!("  {} {}", "Backend:".bold(), report.frozen_executable.display());
            }
            if let Some(hidden) = &report.hidden_imports {
                println!("  {} {}", "Hidden imports:".bold(), hidden.join(", "));
            }
            println!("  {} {}", "Installer:".bold(), report.release_dir.display());
        }

        Commands::DataDir { app_name } => {
            let env = SystemEnvironment;
            let path = data_dir(&env, app_name)?;
            println!("{}", path.display());
        }

        Commands::Call {
            method,
            params,
            backend,
        } => {
            let params = parse_params(&params)?;
            let command = match backend {
                Some(program) => BackendCommand::new(program),
                None => {
                    let cwd = std::env::current_dir().context("Failed to read current directory")?;
                    BackendCommand::frozen(&BuildLayout::new(cwd).dist)
                }
            };

            let result = call_once(command, &method, params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Places the bundled template may live, most specific first
///
/// Covers `<prefix>/bin/eclips` installs, a template next to the binary, and
/// `target/<profile>/eclips` inside this workspace.
fn template_candidates(exe: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = exe
        .parent()
        .into_iter()
        .flat_map(|dir| dir.ancestors().take(3))
        .map(|dir| dir.join(BUNDLED_TEMPLATE))
        .collect();
    candidates.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(BUNDLED_TEMPLATE));
    candidates
}

fn find_template(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.join("package.json").is_file())
        .cloned()
        .with_context(|| {
            let searched: Vec<String> = candidates.iter().map(|c| c.display().to_string()).collect();
            format!(
                "No bundled template found (searched {}); pass --template or set ECLIPS_TEMPLATE_DIR",
                searched.join(", ")
            )
        })
}

fn data_dir(env: &dyn HostEnvironment, app_name: Option<String>) -> Result<PathBuf> {
    let name = match app_name {
        Some(name) => name,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            resolve_app_name(env, &cwd.join("package.json"), DEFAULT_APP_NAME)?
        }
    };

    Ok(app_data_dir(env, &name)?)
}

fn parse_params(raw: &str) -> Result<Value> {
    let params: Value = serde_json::from_str(raw).context("Invalid JSON params")?;
    if !params.is_object() {
        anyhow::bail!("params must be a JSON object, got {}", params);
    }
    Ok(params)
}

async fn call_once(command: BackendCommand, method: &str, params: Value) -> Result<Value> {
    let program = command.program.clone();
    let client = BackendClient::spawn(command)?;

    let outcome = client.call(method, params).await;
    client
        .shutdown(SHUTDOWN_GRACE)
        .await
        .with_context(|| format!("Failed to stop backend {}", program))?;

    match outcome {
        Ok(result) => Ok(result),
        Err(SdkError::Backend { message, trace, .. }) => {
            eprintln!("{}", trace.dimmed());
            anyhow::bail!("{}", message)
        }
        Err(e) => Err(e.into()),
    }
}
