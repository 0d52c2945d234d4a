// Eclips Infrastructure - System Adapters
// Implements: CommandRunner, HostEnvironment, logging sinks, config loading

pub mod config_loader;
pub mod host_env;
pub mod logging;
pub mod subprocess_runner;

pub use config_loader::load_build_config;
pub use host_env::SystemEnvironment;
pub use logging::{Logger, LoggerRegistry, SinkSpec};
pub use subprocess_runner::SubprocessRunner;
