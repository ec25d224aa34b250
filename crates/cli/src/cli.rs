use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI, configuration or platform selection error exit code
pub const EXIT_CLI: i32 = 2;
/// Fetch, verification or install error exit code
pub const EXIT_INSTALL: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI, descriptor or platform error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(jfrm::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Install pipeline error (exit code 3)
    #[error("Install error: {message}")]
    #[diagnostic(code(jfrm::cli::install))]
    Install {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(jfrm::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Short machine-readable category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Install { .. } => "install",
            Self::Other { .. } => "other",
        }
    }
}

/// Convert `jfrm_core::Error` to the appropriate `CliError` variant.
///
/// - Platform selection and descriptor errors -> Config (exit code 2)
/// - Network, integrity, install and strict verification errors -> Install (exit code 3)
impl From<jfrm_core::Error> for CliError {
    fn from(err: jfrm_core::Error) -> Self {
        use jfrm_core::Error;

        let help = miette::Diagnostic::help(&err).map(|h| h.to_string());
        let message = err.to_string();
        match err {
            Error::UnsupportedPlatform { .. } | Error::Descriptor { .. } => {
                Self::Config { message, help }
            }
            Error::Network { .. }
            | Error::Integrity { .. }
            | Error::Install { .. }
            | Error::Verification { .. } => Self::Install { message, help },
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Install { .. } | CliError::Other { .. } => EXIT_INSTALL,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Install the jfrm release binary for this machine.
#[derive(Parser, Debug)]
#[command(name = "jfrm-install")]
#[command(about = "Install the jfrm (JFrog Release Manager) binary for this platform")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        value_enum,
        help = "Log format on stderr (default: json with --json, else compact)"
    )]
    pub log_format: Option<TracingFormat>,

    /// Emit JSON envelope instead of text.
    #[arg(long, global = true, help = "Emit JSON envelope instead of text")]
    pub json: bool,

    /// Formula descriptor file to use instead of the built-in one.
    #[arg(
        long,
        global = true,
        env = "JFRM_FORMULA",
        help = "TOML formula descriptor to use instead of the built-in jfrm formula"
    )]
    pub formula: Option<PathBuf>,

    /// Target platform instead of the detected one.
    #[arg(
        long,
        global = true,
        help = "Target platform as os-arch (e.g. linux-arm64) instead of the host"
    )]
    pub platform: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, verify and install the binary.
    #[command(about = "Fetch, verify and install the binary")]
    Install {
        /// Directory receiving the binary.
        #[arg(long, env = "JFRM_BIN_DIR", help = "Directory to install the binary into")]
        bin_dir: Option<PathBuf>,

        /// Expected SHA-256 of the archive, overriding the formula.
        #[arg(long, help = "Expected SHA-256 of the archive, overriding the formula")]
        sha256: Option<String>,

        /// Do not run `<binary> --help` after installing.
        #[arg(long, help = "Skip the post-install --help check")]
        skip_smoke_test: bool,

        /// Fail when the post-install check fails.
        #[arg(long, help = "Fail when the post-install --help check fails")]
        strict: bool,

        /// Download timeout in seconds.
        #[arg(long, default_value_t = 300, help = "Download timeout in seconds")]
        timeout: u64,

        /// Post-install check timeout in seconds.
        #[arg(long, default_value_t = 30, help = "Post-install check timeout in seconds")]
        smoke_timeout: u64,
    },
    /// Show the artifact selected for the platform.
    #[command(about = "Show the artifact selected for the platform")]
    Show,
    /// List every artifact of the formula.
    #[command(about = "List every artifact of the formula")]
    List,
    /// Print the formula as a Homebrew Ruby formula.
    #[command(about = "Print the formula as a Homebrew Ruby formula")]
    Formula,
}

/// Parse command line arguments into a CLI structure.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
