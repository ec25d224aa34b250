//! SHA-256 verification of downloaded archives.

use jfrm_core::{Error, Result, SelectedArtifact};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Compute the lowercase hex SHA-256 of a byte slice.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Refuse artifacts whose expected checksum is not a real digest.
///
/// # Errors
///
/// Returns [`Error::Integrity`] for placeholders or malformed values.
pub fn ensure_pinned(selected: &SelectedArtifact) -> Result<()> {
    if selected.is_pinned() {
        Ok(())
    } else {
        Err(Error::unpinned(&selected.url, &selected.sha256))
    }
}

/// Check downloaded bytes against the selected record's checksum.
///
/// Returns the computed digest on success.
///
/// # Errors
///
/// Returns [`Error::Integrity`] if nothing is pinned or the digests differ.
pub fn verify_bytes(selected: &SelectedArtifact, data: &[u8]) -> Result<String> {
    ensure_pinned(selected)?;

    let actual = sha256_hex(data);
    if !selected.sha256.eq_ignore_ascii_case(&actual) {
        return Err(Error::integrity(&selected.url, &selected.sha256, actual));
    }

    debug!(url = %selected.url, sha256 = %actual, "Checksum verified");
    Ok(actual)
}
