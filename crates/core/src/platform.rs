//! Platform identification: operating system and CPU architecture.
//!
//! Release archives are published per `(os, arch)` pair, named with the
//! Go-style identifiers `darwin`/`linux` and `arm64`/`amd64`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Platform identifier combining OS and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// All platforms a release is published for.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [
            Self::new(Os::Darwin, Arch::Arm64),
            Self::new(Os::Darwin, Arch::Amd64),
            Self::new(Os::Linux, Arch::Arm64),
            Self::new(Os::Linux, Arch::Amd64),
        ]
    }

    /// Detect the platform of the running host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] on any OS or architecture
    /// other than macOS/Linux on arm64/amd64.
    pub fn current() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a platform from separate OS and architecture names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if either name is unknown.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        match (Os::parse(os), Arch::parse(arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(Error::unsupported_platform(os, arch)),
        }
    }

    /// Parse from string like "darwin-arm64" or "linux_amd64".
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if the string is not an
    /// `os-arch` pair of known names.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.splitn(2, ['-', '_', '/']).collect();
        if parts.len() != 2 {
            return Err(Error::unsupported_platform(s, ""));
        }
        Self::from_parts(parts[0], parts[1])
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl std::str::FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Os {
    /// macOS
    Darwin,
    /// Linux
    Linux,
}

impl Os {
    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "darwin" | "macos" | "osx" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }

    /// Name used in release asset file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }
}

impl TryFrom<String> for Os {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown operating system '{s}'"))
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Arch {
    /// ARM64/aarch64
    Arm64,
    /// AMD64/`x86_64`
    Amd64,
}

impl Arch {
    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arm64" | "aarch64" => Some(Self::Arm64),
            "amd64" | "x86_64" | "x64" => Some(Self::Amd64),
            _ => None,
        }
    }

    /// Name used in release asset file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::Amd64 => "amd64",
        }
    }
}

impl TryFrom<String> for Arch {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown architecture '{s}'"))
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
