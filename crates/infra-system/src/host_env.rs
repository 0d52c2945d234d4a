// Host environment backed by the real process environment

use directories::BaseDirs;
use eclips_core::domain::Platform;
use eclips_core::port::HostEnvironment;
use std::path::PathBuf;

/// Reads env vars and the home directory of the running process
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl HostEnvironment for SystemEnvironment {
    fn platform(&self) -> Platform {
        Platform::current()
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_is_current() {
        assert_eq!(SystemEnvironment.platform(), Platform::current());
    }

    #[test]
    fn test_var_reads_process_env() {
        // PATH is set in every test environment we run in
        assert!(SystemEnvironment.var("PATH").is_some());
        assert!(SystemEnvironment
            .var("ECLIPS_TEST_UNSET_VARIABLE_4711")
            .is_none());
    }
}
