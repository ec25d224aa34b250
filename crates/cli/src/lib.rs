//! jfrm-install - installer for the jfrm release binary
//!
//! The binary wires [`cli`] argument parsing to the [`commands`], which drive
//! [`jfrm_installer::Installer`] against a [`jfrm_core::FormulaDescriptor`].

/// CLI argument parsing and exit codes.
pub mod cli;
pub mod commands;
pub mod tracing;
