// Application Layer - Use Cases

pub mod build;
pub mod registry;
pub mod scaffold;
pub mod storage;

// Re-exports
pub use build::{BuildReport, Builder, CleanMode};
pub use registry::{MethodRegistry, MethodRegistryBuilder};
