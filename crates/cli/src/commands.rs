//! Command implementations.
//!
//! Each command returns the text to print on stdout; printing and exit
//! codes are handled by the binary.

use crate::cli::{CliError, OkEnvelope};
use jfrm_core::{FormulaDescriptor, FormulaGenerator, Platform, SelectedArtifact};
use jfrm_installer::{DefaultFetcher, InstallOptions, InstallReport, Installer, SmokeTestOutcome};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Descriptor file; the built-in formula when `None`.
    pub formula: Option<PathBuf>,
    /// Platform override as `os-arch`.
    pub platform: Option<String>,
    /// Emit JSON envelopes.
    pub json: bool,
}

impl GlobalOptions {
    /// Load the descriptor named by `--formula`, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file is invalid.
    pub fn descriptor(&self) -> Result<FormulaDescriptor, CliError> {
        match &self.formula {
            Some(path) => Ok(FormulaDescriptor::load(path)?),
            None => Ok(FormulaDescriptor::builtin()),
        }
    }

    /// The target platform: the override, or the host.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown or unsupported platforms.
    pub fn platform(&self) -> Result<Platform, CliError> {
        let platform = match &self.platform {
            Some(p) => Platform::parse(p)?,
            None => Platform::current()?,
        };
        debug!(%platform, "Target platform");
        Ok(platform)
    }
}

/// Arguments of the `install` command.
#[derive(Debug, Clone)]
pub struct InstallArgs {
    /// Binary directory; see [`default_bin_dir`] when `None`.
    pub bin_dir: Option<PathBuf>,
    /// Checksum override.
    pub sha256: Option<String>,
    /// Skip the `--help` check.
    pub skip_smoke_test: bool,
    /// Make the `--help` check fatal.
    pub strict: bool,
    /// Download timeout.
    pub timeout: Duration,
    /// `--help` check timeout.
    pub smoke_timeout: Duration,
}

/// Default binary directory: the platform executable dir, else `~/.local/bin`.
#[must_use]
pub fn default_bin_dir() -> PathBuf {
    dirs::executable_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("bin")))
        .unwrap_or_else(|| PathBuf::from("bin"))
}

/// Run the install pipeline.
///
/// # Errors
///
/// Returns the pipeline error mapped to a [`CliError`].
#[instrument(skip_all)]
pub async fn execute_install(global: &GlobalOptions, args: InstallArgs) -> Result<String, CliError> {
    let descriptor = global.descriptor()?;
    let platform = global.platform()?;
    let bin_dir = args.bin_dir.unwrap_or_else(default_bin_dir);

    let options = InstallOptions::new(bin_dir)
        .with_sha256(args.sha256)
        .with_smoke_test(!args.skip_smoke_test)
        .with_smoke_timeout(args.smoke_timeout)
        .with_strict(args.strict);

    let installer = Installer::new(descriptor, DefaultFetcher::new(args.timeout)?);
    let report = installer.install(platform, &options).await?;

    if global.json {
        return to_json(&report);
    }
    Ok(format_report(&report))
}

fn format_report(report: &InstallReport) -> String {
    let mut out = format!(
        "Installed {} {} ({}) to {}\n",
        report.name,
        report.version,
        report.platform,
        report.path.display()
    );
    if !report.written {
        out.push_str("  binary was already up to date\n");
    }
    let _ = writeln!(out, "  sha256: {}", report.sha256);
    match &report.smoke_test {
        SmokeTestOutcome::Passed => out.push_str("  --help check passed\n"),
        SmokeTestOutcome::Failed { message } => {
            let _ = writeln!(out, "  warning: --help check failed: {message}");
        }
        SmokeTestOutcome::Skipped => out.push_str("  --help check skipped\n"),
    }
    out
}

#[derive(Serialize)]
struct ArtifactView<'a> {
    #[serde(flatten)]
    artifact: &'a SelectedArtifact,
    pinned: bool,
}

/// Show the artifact selected for the target platform.
///
/// # Errors
///
/// Returns a configuration error if the platform is unsupported.
pub fn execute_show(global: &GlobalOptions) -> Result<String, CliError> {
    let descriptor = global.descriptor()?;
    let selected = descriptor.select(global.platform()?)?;

    if global.json {
        return to_json(&ArtifactView {
            artifact: &selected,
            pinned: selected.is_pinned(),
        });
    }
    Ok(format_artifact(&selected))
}

fn format_artifact(selected: &SelectedArtifact) -> String {
    format!(
        "{} {} ({})\n  url:    {}\n  sha256: {}{}\n  binary: {}\n",
        selected.name,
        selected.version,
        selected.platform,
        selected.url,
        selected.sha256,
        if selected.is_pinned() { "" } else { " (not pinned)" },
        selected.binary,
    )
}

/// List every artifact of the descriptor.
///
/// # Errors
///
/// Returns a configuration error if the descriptor cannot be loaded.
pub fn execute_list(global: &GlobalOptions) -> Result<String, CliError> {
    let descriptor = global.descriptor()?;
    let selected: Vec<SelectedArtifact> = descriptor
        .artifacts
        .iter()
        .map(|a| descriptor.select(a.platform()))
        .collect::<jfrm_core::Result<_>>()?;

    if global.json {
        let views: Vec<ArtifactView<'_>> = selected
            .iter()
            .map(|s| ArtifactView {
                artifact: s,
                pinned: s.is_pinned(),
            })
            .collect();
        return to_json(&views);
    }

    let mut out = format!("{} {}\n", descriptor.name, descriptor.version);
    for s in &selected {
        let _ = writeln!(
            out,
            "  {:<13} {}{}",
            s.platform.to_string(),
            s.url,
            if s.is_pinned() { "" } else { " (not pinned)" }
        );
    }
    Ok(out)
}

/// Render the descriptor as a Homebrew formula.
///
/// # Errors
///
/// Returns a configuration error if the descriptor cannot be loaded.
pub fn execute_formula(global: &GlobalOptions) -> Result<String, CliError> {
    let descriptor = global.descriptor()?;
    let formula = FormulaGenerator::generate(&descriptor);

    if global.json {
        return to_json(&serde_json::json!({ "formula": formula }));
    }
    Ok(formula)
}

fn to_json<T: Serialize>(data: &T) -> Result<String, CliError> {
    serde_json::to_string(&OkEnvelope::new(data))
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| CliError::other(format!("JSON serialization failed: {e}")))
}
