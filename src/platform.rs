//! Host operating system and CPU architecture detection

use std::fmt;

use thiserror::Error;

/// Operating systems with published static PHP builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Macos,
    Linux,
    Windows,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Macos => "macos",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }
}

/// CPU architectures with published static PHP builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Arm64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported platform: {os}/{arch}")]
pub struct UnsupportedPlatform {
    pub os: &'static str,
    pub arch: &'static str,
}

/// An (OS, architecture) pair used to select catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the platform this process is running on
    pub fn current() -> Result<Self, UnsupportedPlatform> {
        Self::from_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn from_target(os: &'static str, arch: &'static str) -> Result<Self, UnsupportedPlatform> {
        let unsupported = || UnsupportedPlatform { os, arch };

        let parsed_os = match os {
            "macos" => Os::Macos,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            _ => return Err(unsupported()),
        };
        let parsed_arch = match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Arm64,
            _ => return Err(unsupported()),
        };

        Ok(Self::new(parsed_os, parsed_arch))
    }

    /// File name of the PHP executable on this platform
    pub fn php_binary_name(&self) -> &'static str {
        match self.os {
            Os::Windows => "php.exe",
            Os::Macos | Os::Linux => "php",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}
