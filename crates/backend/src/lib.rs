//! Eclips backend: the method table and the runtime settings the `app`
//! binary is wired from.

pub mod config;
pub mod methods;

pub use config::RuntimeConfig;
pub use methods::AppContext;
