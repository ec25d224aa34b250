//! Core types for the jfrm installer.
//!
//! This crate holds everything that is decided before any byte is fetched:
//!
//! - [`Platform`], [`Os`], [`Arch`] - host identification
//! - [`ReleaseArtifact`] - one archive URL and its pinned SHA-256
//! - [`FormulaDescriptor`] - formula metadata plus the artifact table, with
//!   selection of exactly one record per platform
//! - [`FormulaGenerator`] - rendering a descriptor as a Homebrew formula
//! - [`Error`] - the failure taxonomy shared by the whole pipeline
//!
//! # Example
//!
//! ```
//! use jfrm_core::{FormulaDescriptor, Platform};
//!
//! let formula = FormulaDescriptor::builtin();
//! let selected = formula.select(Platform::parse("linux-arm64")?)?;
//! assert!(selected.url.ends_with("jfrm_linux_arm64.tar.gz"));
//! # Ok::<(), jfrm_core::Error>(())
//! ```

#![warn(missing_docs)]

pub mod artifact;
pub mod descriptor;
mod error;
pub mod formula;
pub mod platform;

pub use artifact::{ReleaseArtifact, is_sha256_hex};
pub use descriptor::{FormulaDescriptor, PLACEHOLDER_SHA256, SelectedArtifact};
pub use error::{Error, Result};
pub use formula::FormulaGenerator;
pub use platform::{Arch, Os, Platform};
