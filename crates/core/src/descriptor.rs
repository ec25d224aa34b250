//! Formula descriptors: release metadata plus the per-platform artifact table.
//!
//! A descriptor is either the built-in jfrm table or a TOML file with the
//! same shape:
//!
//! ```toml
//! name = "jfrm"
//! desc = "JFrog Release Manager"
//! homepage = "https://github.com/bhanurp/jfrm"
//! version = "0.0.1"
//!
//! [[artifacts]]
//! os = "darwin"
//! arch = "arm64"
//! url = "https://github.com/bhanurp/jfrm/releases/download/v{version}/jfrm_{os}_{arch}.tar.gz"
//! sha256 = "..."
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::artifact::ReleaseArtifact;
use crate::platform::{Arch, Os, Platform};
use crate::{Error, Result};

/// Checksum value shipped in the published formula for every platform.
pub const PLACEHOLDER_SHA256: &str = "YOUR_SHA256_HERE";

const JFRM_URL_TEMPLATE: &str =
    "https://github.com/bhanurp/jfrm/releases/download/v{version}/jfrm_{os}_{arch}.tar.gz";

/// Declarative description of one installable release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaDescriptor {
    /// Formula name (e.g., "jfrm").
    pub name: String,
    /// One-line description.
    #[serde(default)]
    pub desc: String,
    /// Project homepage.
    #[serde(default)]
    pub homepage: String,
    /// Release version.
    pub version: String,
    /// Executable name inside the archive; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// One record per supported platform.
    #[serde(default)]
    pub artifacts: Vec<ReleaseArtifact>,
}

/// The record chosen for a platform, with its URL expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedArtifact {
    /// Formula name.
    pub name: String,
    /// Release version.
    pub version: String,
    /// Executable name to extract and install.
    pub binary: String,
    /// Platform the record was selected for.
    pub platform: Platform,
    /// Concrete download URL.
    pub url: String,
    /// Expected SHA-256 of the archive.
    pub sha256: String,
}

impl SelectedArtifact {
    /// Whether the expected checksum is a real digest.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        crate::artifact::is_sha256_hex(&self.sha256)
    }

    /// Replace the expected checksum for this run.
    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = sha256.into();
        self
    }
}

impl FormulaDescriptor {
    /// The jfrm formula as published.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            name: "jfrm".to_string(),
            desc: "JFrog Release Manager - Manage releases and dependencies for JFrog projects"
                .to_string(),
            homepage: "https://github.com/bhanurp/jfrm".to_string(),
            version: "0.0.1".to_string(),
            binary: None,
            artifacts: Platform::all()
                .into_iter()
                .map(|p| ReleaseArtifact::new(p, JFRM_URL_TEMPLATE, PLACEHOLDER_SHA256))
                .collect(),
        }
    }

    /// Parse and validate a descriptor from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] if the text is not valid TOML, misses
    /// required fields, or fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let descriptor: Self =
            toml::from_str(text).map_err(|e| Error::descriptor(e.message().to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Load and validate a descriptor file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(?path, "Loading formula descriptor");
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::descriptor(format!("cannot read file: {e}")).with_descriptor_path(path)
        })?;
        Self::from_toml_str(&text).map_err(|e| e.with_descriptor_path(path))
    }

    /// Check the structural invariants of the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] on an empty name/version/URL or on two
    /// records for the same platform.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::descriptor("'name' must not be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(Error::descriptor("'version' must not be empty"));
        }
        if self.binary.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return Err(Error::descriptor("'binary' must not be empty when set"));
        }

        let mut seen = HashSet::new();
        for artifact in &self.artifacts {
            let platform = artifact.platform();
            if artifact.url.trim().is_empty() {
                return Err(Error::descriptor(format!("empty url for {platform}")));
            }
            if !seen.insert(platform) {
                return Err(Error::descriptor(format!(
                    "more than one artifact for {platform}"
                )));
            }
        }
        Ok(())
    }

    /// Executable name inside the archive.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        self.binary.as_deref().unwrap_or(&self.name)
    }

    /// Look up the raw record for a platform.
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&ReleaseArtifact> {
        self.artifacts.iter().find(|a| a.platform() == platform)
    }

    /// Select the record for a platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if no record matches.
    pub fn select(&self, platform: Platform) -> Result<SelectedArtifact> {
        let artifact = self
            .get(platform)
            .ok_or_else(|| Error::unsupported_platform(platform.os.as_str(), platform.arch.as_str()))?;

        let selected = SelectedArtifact {
            name: self.name.clone(),
            version: self.version.clone(),
            binary: self.binary_name().to_string(),
            platform,
            url: artifact.expanded_url(&self.version),
            sha256: artifact.sha256.clone(),
        };
        debug!(%platform, url = %selected.url, "Selected release artifact");
        Ok(selected)
    }

    /// Select by raw OS and architecture names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if either name is unknown or
    /// no record matches.
    pub fn select_for(&self, os: &str, arch: &str) -> Result<SelectedArtifact> {
        self.select(Platform::from_parts(os, arch)?)
    }

    /// Records for macOS and Linux, ARM first, in a stable order.
    #[must_use]
    pub fn records_for(&self, os: Os) -> Vec<&ReleaseArtifact> {
        [Arch::Arm64, Arch::Amd64]
            .into_iter()
            .filter_map(|arch| self.get(Platform::new(os, arch)))
            .collect()
    }
}
