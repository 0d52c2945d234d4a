//! Eclips Backend - Main Entry Point
//! Serves the method table over stdin/stdout until the front end closes stdin

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use eclips_api_stdio::StdioServer;
use eclips_backend::config::{RuntimeConfig, DEFAULT_APP_NAME, LOGGER_NAME};
use eclips_backend::methods::{self, AppContext};
use eclips_core::application::storage::{app_data_dir, resolve_app_name};
use eclips_core::application::MethodRegistryBuilder;
use eclips_core::port::MethodProvider;
use eclips_infra_system::{LoggerRegistry, SystemEnvironment};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Runtime configuration
    let env = SystemEnvironment;
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config = RuntimeConfig::from_env(&env, &cwd);

    // 2. Logging (file + stderr; stdout belongs to the protocol)
    let loggers = LoggerRegistry::new(config.log_dir());
    let logger = loggers
        .get_logger(LOGGER_NAME)
        .with_context(|| format!("Failed to open log file {}", loggers.log_file().display()))?;
    logger
        .install_global()
        .context("Failed to install backend logger")?;

    info!(
        version = VERSION,
        backend_dir = %config.backend_dir.display(),
        "Eclips backend starting"
    );

    // 3. Application identity and data directory
    let app_name = resolve_app_name(&env, &config.package_json(), DEFAULT_APP_NAME)?;
    let data_dir = app_data_dir(&env, &app_name)?;
    info!(app = %app_name, data_dir = %data_dir.display(), "Application data directory resolved");

    // 4. Method registry (frozen before serving)
    let ctx = Arc::new(AppContext {
        name: app_name,
        version: VERSION.to_string(),
        data_dir,
    });
    let mut builder = MethodRegistryBuilder::new();
    methods::register(&mut builder, ctx);
    let registry = builder.build().context("Failed to load backend methods")?;
    info!(methods = ?registry.list_methods(), "Method registry loaded");

    // 5. Serve until stdin closes
    let server = StdioServer::new(Arc::new(registry));
    let summary = server
        .run_stdio()
        .await
        .context("Bridge loop failed")?;

    info!(
        requests = summary.requests,
        failures = summary.failures,
        "Shutdown complete."
    );

    Ok(())
}
