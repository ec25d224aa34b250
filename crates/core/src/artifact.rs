//! Release artifact records.

use serde::{Deserialize, Serialize};

use crate::platform::{Arch, Os, Platform};

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// One downloadable archive for a single `(os, arch)` pair.
///
/// Records are embedded in a descriptor at authoring time and never change
/// during an install run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArtifact {
    /// Operating system the archive is built for.
    pub os: Os,
    /// CPU architecture the archive is built for.
    pub arch: Arch,
    /// Download URL; may contain `{version}`, `{os}` and `{arch}`.
    pub url: String,
    /// Expected SHA-256 of the archive bytes, hex encoded.
    pub sha256: String,
}

impl ReleaseArtifact {
    /// Create a new record.
    #[must_use]
    pub fn new(platform: Platform, url: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            os: platform.os,
            arch: platform.arch,
            url: url.into(),
            sha256: sha256.into(),
        }
    }

    /// The platform this record serves.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        Platform::new(self.os, self.arch)
    }

    /// Whether the record carries a real SHA-256 digest.
    ///
    /// Placeholders such as `YOUR_SHA256_HERE` are not pinned and can never
    /// be satisfied by downloaded bytes.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        is_sha256_hex(&self.sha256)
    }

    /// Compare a computed digest against the pinned one, ignoring case.
    #[must_use]
    pub fn matches_digest(&self, actual: &str) -> bool {
        self.is_pinned() && self.sha256.eq_ignore_ascii_case(actual)
    }

    /// Expand template variables in the URL.
    #[must_use]
    pub fn expanded_url(&self, version: &str) -> String {
        self.url
            .replace("{version}", version)
            .replace("{os}", self.os.as_str())
            .replace("{arch}", self.arch.as_str())
    }
}

/// Check that a string is a hex-encoded SHA-256 digest.
#[must_use]
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == SHA256_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}
