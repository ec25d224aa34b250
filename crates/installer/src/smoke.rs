//! Post-install smoke test: run the installed binary with `--help`.

use jfrm_core::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Default time the binary gets to answer `--help`.
pub const DEFAULT_SMOKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Flag passed to the installed binary.
pub const HELP_FLAG: &str = "--help";

/// Run `<binary> --help` and require a zero exit code.
///
/// # Errors
///
/// Returns [`Error::Verification`] if the binary cannot be spawned, exits
/// non-zero, or does not finish within `timeout`.
pub async fn smoke_test(binary: &Path, timeout: Duration) -> Result<()> {
    debug!(?binary, ?timeout, "Running smoke test");

    let child = Command::new(binary)
        .arg(HELP_FLAG)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::verification(binary, format!("failed to run: {e}")))?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| Error::verification(binary, format!("timed out after {timeout:?}")))?
        .map_err(|e| Error::verification(binary, format!("failed to wait: {e}")))?;

    if output.status.success() {
        debug!(?binary, "Smoke test passed");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.lines().next().unwrap_or_default().trim();
    let status = output
        .status
        .code()
        .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"));

    Err(Error::verification(
        binary,
        if detail.is_empty() {
            status
        } else {
            format!("{status}: {detail}")
        },
    ))
}
