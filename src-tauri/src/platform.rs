use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    pub fn executable_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            _ => "",
        }
    }

    /// The app keeps running with no windows open and waits for a dock click.
    pub fn stays_resident_without_windows(self) -> bool {
        self == Self::MacOs
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "win32",
            Self::MacOs => "darwin",
            Self::Linux => "linux",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_macos_stays_resident() {
        assert!(Platform::MacOs.stays_resident_without_windows());
        assert!(!Platform::Windows.stays_resident_without_windows());
        assert!(!Platform::Linux.stays_resident_without_windows());
        assert!(!Platform::Other.stays_resident_without_windows());
    }

    #[test]
    fn display_uses_node_style_names() {
        assert_eq!(Platform::Windows.to_string(), "win32");
        assert_eq!(Platform::MacOs.to_string(), "darwin");
        assert_eq!(Platform::Linux.to_string(), "linux");
    }

    #[test]
    fn only_windows_executables_carry_a_suffix() {
        assert_eq!(Platform::Windows.executable_suffix(), ".exe");
        assert_eq!(Platform::Linux.executable_suffix(), "");
        assert_eq!(Platform::MacOs.executable_suffix(), "");
    }
}
