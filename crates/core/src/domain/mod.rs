// Domain Layer - Pure business logic and entities

pub mod build;
pub mod method;
pub mod platform;

// Re-exports
pub use build::{BuildConfig, BuildLayout, BASELINE_HIDDEN_IMPORTS};
pub use method::{HandlerError, MethodError, NoParams};
pub use platform::Platform;
