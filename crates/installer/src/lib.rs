//! Install pipeline for jfrm release archives.
//!
//! Fetches the archive selected by a [`jfrm_core::FormulaDescriptor`],
//! verifies its SHA-256, extracts the executable from the `.tar.gz`,
//! installs it into a binary directory and smoke-tests it with `--help`.
//!
//! # Example
//!
//! ```ignore
//! use jfrm_core::{FormulaDescriptor, Platform};
//! use jfrm_installer::{DefaultFetcher, InstallOptions, Installer};
//!
//! let installer = Installer::new(FormulaDescriptor::load(path)?, DefaultFetcher::new(timeout)?);
//! let report = installer
//!     .install(Platform::current()?, &InstallOptions::new("/usr/local/bin"))
//!     .await?;
//! ```

#![warn(missing_docs)]

pub mod extract;
pub mod fetch;
pub mod install;
mod pipeline;
pub mod smoke;
pub mod verify;

pub use fetch::{DEFAULT_FETCH_TIMEOUT, DefaultFetcher, Fetcher, FileFetcher, HttpFetcher};
pub use pipeline::{InstallOptions, InstallReport, Installer, SmokeTestOutcome};
