//! Operating system detection.

use std::fmt;

use once_cell::sync::Lazy;
use sysinfo::System;

/// Operating system family, which selects the error-code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Windows,
    Linux,
    Macos,
    Other,
}

static HOST: Lazy<OperatingSystem> = Lazy::new(|| from_name(System::name().as_deref()));

fn from_name(name: Option<&str>) -> OperatingSystem {
    match name {
        Some("Windows") => OperatingSystem::Windows,
        Some("Darwin") | Some("macOS") => OperatingSystem::Macos,
        Some(name) if name.starts_with("Linux") => OperatingSystem::Linux,
        _ => from_target(),
    }
}

// Distributions report their own name ("Ubuntu", "Arch Linux", ...), so fall
// back to the compile target when the reported name is not a family name.
fn from_target() -> OperatingSystem {
    if cfg!(target_os = "windows") {
        OperatingSystem::Windows
    } else if cfg!(target_os = "macos") {
        OperatingSystem::Macos
    } else if cfg!(any(target_os = "linux", target_os = "android")) {
        OperatingSystem::Linux
    } else {
        OperatingSystem::Other
    }
}

/// Detect the host operating system. Memoized for the process lifetime.
pub fn detect() -> OperatingSystem { *HOST }

impl OperatingSystem {
    pub fn is_posix(self) -> bool { matches!(self, Self::Linux | Self::Macos) }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
