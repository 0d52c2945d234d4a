// Host Environment Port (for testability)

use crate::domain::Platform;
use std::path::PathBuf;

/// Read-only view of the host the backend runs on
pub trait HostEnvironment: Send + Sync {
    fn platform(&self) -> Platform;

    /// Environment variable lookup; unset or non-UTF-8 values are `None`
    fn var(&self, key: &str) -> Option<String>;

    /// Current user's home directory
    fn home_dir(&self) -> Option<PathBuf>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Fixed environment for deterministic tests
    #[derive(Debug, Clone)]
    pub struct FixedEnvironment {
        platform: Platform,
        vars: HashMap<String, String>,
        home: Option<PathBuf>,
    }

    impl FixedEnvironment {
        pub fn new(platform: Platform, home: Option<PathBuf>) -> Self {
            Self {
                platform,
                vars: HashMap::new(),
                home,
            }
        }

        pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.vars.insert(key.into(), value.into());
            self
        }
    }

    impl HostEnvironment for FixedEnvironment {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn var(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned()
        }

        fn home_dir(&self) -> Option<PathBuf> {
            self.home.clone()
        }
    }
}
