//! Error taxonomy shared by every stage of the install pipeline.
//!
//! Each variant maps to one failure class of the pipeline
//! (select → fetch → verify → install → smoke-test). All of them abort the
//! run except [`Error::Verification`], which callers report as a warning.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while selecting, fetching or installing an artifact.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No release artifact exists for the requested platform.
    #[error("Unsupported platform: {os}-{arch}")]
    #[diagnostic(
        code(jfrm::unsupported_platform),
        help("Supported platforms: darwin-arm64, darwin-amd64, linux-arm64, linux-amd64")
    )]
    UnsupportedPlatform {
        /// Operating system as detected or requested
        os: String,
        /// CPU architecture as detected or requested
        arch: String,
    },

    /// Downloading the artifact failed.
    #[error("Failed to fetch {url}: {message}")]
    #[diagnostic(
        code(jfrm::network),
        help("Check your network connection, or set GITHUB_TOKEN if you are rate limited")
    )]
    Network {
        /// URL that was being fetched
        url: String,
        /// The error message
        message: String,
    },

    /// The archive cannot be trusted: its bytes do not hash to the pinned
    /// checksum, or no real checksum is pinned (detected before fetching).
    #[error("Integrity check failed for {url}: {}", integrity_reason(.expected, .actual))]
    #[diagnostic(code(jfrm::integrity))]
    Integrity {
        /// URL of the rejected artifact
        url: String,
        /// The pinned checksum, as found in the descriptor
        expected: String,
        /// The computed checksum; `None` when nothing was fetched
        actual: Option<String>,
        /// What the user can do about it
        #[help]
        help: String,
    },

    /// Extracting or writing the executable failed.
    #[error("Install failed: {message}")]
    #[diagnostic(
        code(jfrm::install),
        help("Check permissions and free space in the binary directory")
    )]
    Install {
        /// The error message
        message: String,
        /// The path involved, if any
        path: Option<PathBuf>,
        /// The underlying I/O error, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// The installed binary did not pass its smoke test.
    #[error("Post-install check failed for {}: {message}", path.display())]
    #[diagnostic(code(jfrm::verification))]
    Verification {
        /// Path of the installed binary
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// A formula descriptor is malformed or unreadable.
    #[error("Invalid formula descriptor: {message}")]
    #[diagnostic(code(jfrm::descriptor))]
    Descriptor {
        /// The error message
        message: String,
        /// The descriptor file, if loaded from disk
        path: Option<PathBuf>,
    },
}

fn integrity_reason(expected: &str, actual: &Option<String>) -> String {
    match actual {
        Some(actual) => format!("checksum mismatch, expected {expected}, got {actual}"),
        None => format!("checksum '{expected}' is not pinned"),
    }
}

impl Error {
    /// Create an unsupported platform error.
    #[must_use]
    pub fn unsupported_platform(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a checksum mismatch error.
    #[must_use]
    pub fn integrity(
        url: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Integrity {
            url: url.into(),
            expected: expected.into(),
            actual: Some(actual.into()),
            help: "The artifact may be corrupted or tampered with; nothing was installed".to_string(),
        }
    }

    /// Create an integrity error for a record without a usable SHA-256.
    #[must_use]
    pub fn unpinned(url: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Integrity {
            url: url.into(),
            expected: value.into(),
            actual: None,
            help: "Pass --sha256 <hex> or use a formula file with a 64-character SHA-256"
                .to_string(),
        }
    }

    /// Whether this is an integrity error raised before any download.
    #[must_use]
    pub const fn is_unpinned(&self) -> bool {
        matches!(self, Self::Integrity { actual: None, .. })
    }

    /// Create an install error without an underlying I/O source.
    #[must_use]
    pub fn install(message: impl Into<String>) -> Self {
        Self::Install {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create an install error from an I/O failure on a path.
    #[must_use]
    pub fn install_io(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Install {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create a verification error.
    #[must_use]
    pub fn verification(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Verification {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a descriptor error.
    #[must_use]
    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::Descriptor {
            message: message.into(),
            path: None,
        }
    }

    /// Attach the descriptor file path to a descriptor error.
    #[must_use]
    pub fn with_descriptor_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Self::Descriptor { message, .. } => Self::Descriptor {
                message,
                path: Some(file.into()),
            },
            other => other,
        }
    }

    /// Whether the pipeline must stop on this error.
    ///
    /// Only a failed smoke test leaves the install in place.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Verification { .. })
    }
}
