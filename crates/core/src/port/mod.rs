// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod host_env;
pub mod method_provider;

// Re-exports
pub use command_runner::{
    CommandRunner, CommandSpec, ExecutionError, ExecutionResult, ExecutionStatus,
};
pub use host_env::HostEnvironment;
pub use method_provider::MethodProvider;
