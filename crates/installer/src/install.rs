//! Placing the executable into the binary directory.

use jfrm_core::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the binary ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    /// Final path of the executable.
    pub path: PathBuf,
    /// False when an identical file was already in place.
    pub written: bool,
}

/// Write `contents` as the executable `name` inside `bin_dir`.
///
/// The file is staged next to its destination and renamed over it, so the
/// destination is never left half-written. Identical existing files are
/// left untouched.
///
/// # Errors
///
/// Returns [`Error::Install`] if `name` is not a plain file name or on any
/// filesystem failure.
pub fn install_binary(bin_dir: &Path, name: &str, contents: &[u8]) -> Result<InstalledBinary> {
    validate_name(name)?;

    std::fs::create_dir_all(bin_dir)
        .map_err(|e| Error::install_io("cannot create binary directory", bin_dir, e))?;

    let dest = bin_dir.join(name);

    if is_up_to_date(&dest, contents) {
        debug!(?dest, "Binary already installed");
        set_executable(&dest)?;
        return Ok(InstalledBinary {
            path: dest,
            written: false,
        });
    }

    let staging = bin_dir.join(format!(".{name}.tmp-{}", std::process::id()));
    let staged = write_staged(&staging, contents).and_then(|()| {
        set_executable(&staging)?;
        std::fs::rename(&staging, &dest)
            .map_err(|e| Error::install_io("cannot move binary into place", &dest, e))
    });
    if let Err(e) = staged {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }

    info!(path = ?dest, size = contents.len(), "Installed binary");
    Ok(InstalledBinary {
        path: dest,
        written: true,
    })
}

fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::install(format!(
            "refusing to install '{name}': not a plain file name"
        ))),
    }
}

fn is_up_to_date(dest: &Path, contents: &[u8]) -> bool {
    std::fs::read(dest).is_ok_and(|existing| existing == contents)
}

fn write_staged(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .map_err(|e| Error::install_io("cannot create staging file", path, e))?;
    file.write_all(contents)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::install_io("cannot write binary", path, e))
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| Error::install_io("cannot set executable permission", path, e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_install_creates_dir_and_file() {
        let temp = TempDir::new().unwrap();
        let bin_dir = temp.path().join("nested").join("bin");

        let installed = install_binary(&bin_dir, "jfrm", b"binary").unwrap();
        assert_eq!(installed.path, bin_dir.join("jfrm"));
        assert!(installed.written);
        assert_eq!(std::fs::read(&installed.path).unwrap(), b"binary");
    }

    #[cfg(unix)]
    #[test]
    fn test_install_sets_mode() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();

        let installed = install_binary(temp.path(), "jfrm", b"binary").unwrap();
        let mode = std::fs::metadata(&installed.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_install_is_idempotent() {
        let temp = TempDir::new().unwrap();

        let first = install_binary(temp.path(), "jfrm", b"binary").unwrap();
        let second = install_binary(temp.path(), "jfrm", b"binary").unwrap();
        assert!(first.written);
        assert!(!second.written);
        assert_eq!(std::fs::read(&second.path).unwrap(), b"binary");
    }

    #[test]
    fn test_install_replaces_different_content() {
        let temp = TempDir::new().unwrap();

        install_binary(temp.path(), "jfrm", b"old").unwrap();
        let installed = install_binary(temp.path(), "jfrm", b"new").unwrap();
        assert!(installed.written);
        assert_eq!(std::fs::read(&installed.path).unwrap(), b"new");
    }

    #[test]
    fn test_install_leaves_no_staging_files() {
        let temp = TempDir::new().unwrap();
        install_binary(temp.path(), "jfrm", b"binary").unwrap();

        let names: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("jfrm")]);
    }

    #[test]
    fn test_install_rejects_paths() {
        let temp = TempDir::new().unwrap();
        for name in ["../jfrm", "sub/jfrm", "/etc/jfrm", "", "."] {
            assert!(
                install_binary(temp.path(), name, b"x").is_err(),
                "{name} should be rejected"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_install_into_readonly_dir_fails() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let bin_dir = temp.path().join("ro");
        std::fs::create_dir(&bin_dir).unwrap();
        std::fs::set_permissions(&bin_dir, std::fs::Permissions::from_mode(0o555)).unwrap();

        // root ignores directory permissions
        let probe = bin_dir.join(".probe");
        if std::fs::write(&probe, b"").is_ok() {
            let _ = std::fs::remove_file(&probe);
            return;
        }

        let result = install_binary(&bin_dir, "jfrm", b"binary");
        assert!(matches!(result, Err(Error::Install { .. })));
        std::fs::set_permissions(&bin_dir, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
