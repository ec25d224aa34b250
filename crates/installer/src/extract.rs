//! Executable extraction from release archives (gzip-compressed tarballs).
//!
//! Extraction happens in memory so that nothing reaches the binary
//! directory until the whole archive has been read.

use flate2::read::GzDecoder;
use jfrm_core::{Error, Result};
use std::io::{Cursor, Read};
use std::path::Path;
use tar::Archive;
use tracing::{debug, trace};

/// An executable read out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBinary {
    /// Path of the entry inside the archive.
    pub entry_path: String,
    /// File contents.
    pub contents: Vec<u8>,
}

/// Extract the executable named `binary` from a `.tar.gz` archive.
///
/// The entry whose file name equals `binary` wins, wherever it sits in the
/// archive. Without such an entry, an archive holding exactly one regular
/// file yields that file.
///
/// # Errors
///
/// Returns [`Error::Install`] if the archive cannot be decoded, or if no
/// unambiguous executable is found.
pub fn extract_binary(archive: &[u8], binary: &str) -> Result<ExtractedBinary> {
    debug!(%binary, size = archive.len(), "Extracting binary from archive");

    let decoder = GzDecoder::new(Cursor::new(archive));
    let mut tar = Archive::new(decoder);

    // First non-matching regular file, kept for the single-file fallback.
    let mut first_other: Option<ExtractedBinary> = None;
    let mut other_files = 0usize;
    for entry in tar
        .entries()
        .map_err(|e| Error::install(format!("failed to read archive: {e}")))?
    {
        let mut entry =
            entry.map_err(|e| Error::install(format!("failed to read archive entry: {e}")))?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let entry_path = entry
            .path()
            .map_err(|e| Error::install(format!("invalid path in archive: {e}")))?
            .to_string_lossy()
            .into_owned();
        trace!(%entry_path, "Archive entry");

        let is_binary = Path::new(&entry_path)
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name == binary);
        if !is_binary {
            other_files += 1;
            if other_files > 1 {
                first_other = None;
                continue;
            }
        }

        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|e| Error::install(format!("failed to read '{entry_path}': {e}")))?;

        if is_binary {
            debug!(%entry_path, "Found binary in archive");
            return Ok(ExtractedBinary {
                entry_path,
                contents,
            });
        }
        first_other = Some(ExtractedBinary {
            entry_path,
            contents,
        });
    }

    if let Some(only) = first_other {
        debug!(entry_path = %only.entry_path, "Using the only file in archive");
        return Ok(only);
    }

    Err(Error::install(format!(
        "binary '{binary}' not found in archive ({other_files} other files)"
    )))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tar::{Builder, EntryType};

    /// Build an in-memory tar.gz from `(path, contents)` pairs.
    pub(crate) fn tarball(files: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = Builder::new(encoder);

        for (path, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(path).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_entry_type(EntryType::Regular);
            header.set_cksum();
            builder.append(&header, *content).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_extract_by_name() {
        let archive = tarball(&[("README.md", b"docs"), ("jfrm", b"binary")]);
        let extracted = extract_binary(&archive, "jfrm").unwrap();
        assert_eq!(extracted.entry_path, "jfrm");
        assert_eq!(extracted.contents, b"binary");
    }

    #[test]
    fn test_extract_nested_entry() {
        let archive = tarball(&[
            ("jfrm_linux_amd64/LICENSE", b"MIT"),
            ("jfrm_linux_amd64/jfrm", b"bin"),
        ]);
        let extracted = extract_binary(&archive, "jfrm").unwrap();
        assert_eq!(extracted.entry_path, "jfrm_linux_amd64/jfrm");
        assert_eq!(extracted.contents, b"bin");
    }

    #[test]
    fn test_extract_single_file_fallback() {
        let archive = tarball(&[("jfrm-v0.0.1", b"only")]);
        let extracted = extract_binary(&archive, "jfrm").unwrap();
        assert_eq!(extracted.contents, b"only");
    }

    #[test]
    fn test_extract_ambiguous() {
        let archive = tarball(&[("a", b"1"), ("b", b"2")]);
        let err = extract_binary(&archive, "jfrm").unwrap_err();
        assert!(matches!(err, Error::Install { .. }));
        assert!(err.to_string().contains("not found in archive"));
    }

    #[test]
    fn test_extract_binary_after_many_other_files() {
        let docs = vec![b'x'; 64 * 1024];
        let archive = tarball(&[
            ("docs/manual.html", docs.as_slice()),
            ("docs/assets.bin", docs.as_slice()),
            ("LICENSE", b"MIT"),
            ("jfrm", b"bin"),
        ]);
        let extracted = extract_binary(&archive, "jfrm").unwrap();
        assert_eq!(extracted.entry_path, "jfrm");
        assert_eq!(extracted.contents, b"bin");
    }

    #[test]
    fn test_extract_ambiguous_counts_other_files() {
        let archive = tarball(&[("a", b"1"), ("b", b"2"), ("c", b"3")]);
        let err = extract_binary(&archive, "jfrm").unwrap_err();
        assert!(err.to_string().contains("(3 other files)"));
    }

    #[test]
    fn test_extract_empty_archive() {
        let archive = tarball(&[]);
        assert!(extract_binary(&archive, "jfrm").is_err());
    }

    #[test]
    fn test_extract_not_gzip() {
        let err = extract_binary(b"definitely not a tarball", "jfrm").unwrap_err();
        assert!(matches!(err, Error::Install { .. }));
    }
}
