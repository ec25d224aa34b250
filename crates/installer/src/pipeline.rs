//! The install pipeline: select → fetch → verify → install → smoke-test.
//!
//! Steps run strictly in order and the first fatal error stops the run. A
//! failed smoke test is reported in the [`InstallReport`] and leaves the
//! installed binary in place, unless [`InstallOptions::strict`] is set.

use jfrm_core::{FormulaDescriptor, Platform, Result, SelectedArtifact};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::extract::extract_binary;
use crate::fetch::Fetcher;
use crate::install::install_binary;
use crate::smoke::{DEFAULT_SMOKE_TIMEOUT, smoke_test};
use crate::verify::{ensure_pinned, verify_bytes};

/// Options for one install run.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Directory receiving the executable.
    pub bin_dir: PathBuf,
    /// Replaces the descriptor's checksum for the selected record.
    pub sha256: Option<String>,
    /// Run `<binary> --help` after installing.
    pub smoke_test: bool,
    /// Time limit for the smoke test.
    pub smoke_timeout: Duration,
    /// Treat a failed smoke test as an error.
    pub strict: bool,
}

impl InstallOptions {
    /// Options installing into `bin_dir` with the smoke test enabled.
    #[must_use]
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            sha256: None,
            smoke_test: true,
            smoke_timeout: DEFAULT_SMOKE_TIMEOUT,
            strict: false,
        }
    }

    /// Set the checksum override.
    #[must_use]
    pub fn with_sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256;
        self
    }

    /// Enable or disable the smoke test.
    #[must_use]
    pub fn with_smoke_test(mut self, enabled: bool) -> Self {
        self.smoke_test = enabled;
        self
    }

    /// Set the smoke test time limit.
    #[must_use]
    pub fn with_smoke_timeout(mut self, timeout: Duration) -> Self {
        self.smoke_timeout = timeout;
        self
    }

    /// Make smoke test failures fatal.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Outcome of the post-install check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SmokeTestOutcome {
    /// `--help` exited with code 0.
    Passed,
    /// The check failed; the binary stays installed.
    Failed {
        /// Why the check failed
        message: String,
    },
    /// The check was disabled.
    Skipped,
}

/// Summary of a completed install run.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    /// Formula name.
    pub name: String,
    /// Installed version.
    pub version: String,
    /// Platform the artifact was selected for.
    pub platform: String,
    /// Download URL.
    pub url: String,
    /// Verified SHA-256 of the archive.
    pub sha256: String,
    /// Installed executable.
    pub path: PathBuf,
    /// False when an identical binary was already installed.
    pub written: bool,
    /// Result of the post-install check.
    pub smoke_test: SmokeTestOutcome,
}

/// Runs the install pipeline for one descriptor.
pub struct Installer {
    descriptor: FormulaDescriptor,
    fetcher: Box<dyn Fetcher>,
}

impl Installer {
    /// Create an installer using `fetcher` to download archives.
    #[must_use]
    pub fn new(descriptor: FormulaDescriptor, fetcher: impl Fetcher + 'static) -> Self {
        Self {
            descriptor,
            fetcher: Box::new(fetcher),
        }
    }

    /// Select the artifact for `platform`, applying the checksum override.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedPlatform` if the descriptor has no record for it.
    pub fn select(&self, platform: Platform, options: &InstallOptions) -> Result<SelectedArtifact> {
        let selected = self.descriptor.select(platform)?;
        Ok(match &options.sha256 {
            Some(sha256) => selected.with_sha256(sha256.trim()),
            None => selected,
        })
    }

    /// Install the artifact for `platform`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error of the pipeline. Nothing is written to
    /// the binary directory unless the checksum matched.
    #[instrument(skip(self, options), fields(formula = %self.descriptor.name))]
    pub async fn install(&self, platform: Platform, options: &InstallOptions) -> Result<InstallReport> {
        let selected = self.select(platform, options)?;
        ensure_pinned(&selected)?;

        info!(url = %selected.url, "Fetching artifact");
        let archive = self.fetcher.fetch(&selected.url).await?;

        let sha256 = verify_bytes(&selected, &archive)?;
        info!(%sha256, "Artifact verified");

        let extracted = extract_binary(&archive, &selected.binary)?;
        let installed = install_binary(&options.bin_dir, &selected.binary, &extracted.contents)?;

        let smoke_test = if options.smoke_test {
            match smoke_test(&installed.path, options.smoke_timeout).await {
                Ok(()) => SmokeTestOutcome::Passed,
                Err(e) if options.strict => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Post-install check failed; binary left installed");
                    SmokeTestOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            }
        } else {
            SmokeTestOutcome::Skipped
        };

        info!(
            path = ?installed.path,
            version = %selected.version,
            "Install complete"
        );

        Ok(InstallReport {
            name: selected.name,
            version: selected.version,
            platform: selected.platform.to_string(),
            url: selected.url,
            sha256,
            path: installed.path,
            written: installed.written,
            smoke_test,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_options_defaults() {
        let opts = InstallOptions::new("/usr/local/bin");
        assert_eq!(opts.bin_dir, PathBuf::from("/usr/local/bin"));
        assert!(opts.sha256.is_none());
        assert!(opts.smoke_test);
        assert!(!opts.strict);
        assert_eq!(opts.smoke_timeout, DEFAULT_SMOKE_TIMEOUT);
    }

    #[test]
    fn test_install_options_builder() {
        let opts = InstallOptions::new("/bin")
            .with_sha256(Some("ab".to_string()))
            .with_smoke_test(false)
            .with_smoke_timeout(Duration::from_secs(5))
            .with_strict(true);
        assert_eq!(opts.sha256.as_deref(), Some("ab"));
        assert!(!opts.smoke_test);
        assert!(opts.strict);
        assert_eq!(opts.smoke_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_smoke_outcome_serialization() {
        let json = serde_json::to_string(&SmokeTestOutcome::Failed {
            message: "exit code 1".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"failed","message":"exit code 1"}"#);
        assert_eq!(
            serde_json::to_string(&SmokeTestOutcome::Skipped).unwrap(),
            r#"{"status":"skipped"}"#
        );
    }
}
