// Host platform identity

/// Platform families with distinct application-data conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Linux and every other Unix-like host
    Unix,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// File suffix of native executables (`.exe` on Windows)
    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::MacOs | Platform::Unix => "",
        }
    }

    /// Separator PyInstaller expects between source and destination in `--add-data`
    pub fn path_list_separator(self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::MacOs | Platform::Unix => ':',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exe_suffix() {
        assert_eq!(Platform::Windows.exe_suffix(), ".exe");
        assert_eq!(Platform::Unix.exe_suffix(), "");
        assert_eq!(Platform::MacOs.exe_suffix(), "");
    }

    #[test]
    fn test_current_matches_std_suffix() {
        assert_eq!(
            Platform::current().exe_suffix(),
            std::env::consts::EXE_SUFFIX
        );
    }
}
