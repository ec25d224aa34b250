//! End-to-end tests of the install pipeline against in-memory and HTTP sources.

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use jfrm_core::{Error, FormulaDescriptor, Platform, ReleaseArtifact, Result};
use jfrm_installer::verify::sha256_hex;
use jfrm_installer::{Fetcher, HttpFetcher, InstallOptions, Installer, SmokeTestOutcome};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const PASSING_BINARY: &[u8] = b"#!/bin/sh\n[ \"$1\" = \"--help\" ] && echo 'usage: jfrm' && exit 0\nexit 1\n";
const FAILING_BINARY: &[u8] = b"#!/bin/sh\necho 'boom' >&2\nexit 3\n";

/// Serves a fixed archive and counts requests.
#[derive(Clone)]
struct StaticFetcher {
    archive: Arc<Vec<u8>>,
    calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    fn new(archive: Vec<u8>) -> Self {
        Self {
            archive: Arc::new(archive),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.archive.as_ref().clone())
    }
}

/// Always fails like an unreachable host.
struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(Error::network(url, "connection refused"))
    }
}

fn tarball(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_path(path).unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append(&header, *content).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Built-in descriptor with every record pinned to `sha256`.
fn pinned_descriptor(sha256: &str) -> FormulaDescriptor {
    let mut descriptor = FormulaDescriptor::builtin();
    for artifact in &mut descriptor.artifacts {
        artifact.sha256 = sha256.to_string();
    }
    descriptor
}

fn linux_amd64() -> Platform {
    Platform::parse("linux-amd64").unwrap()
}

#[cfg(unix)]
#[tokio::test]
async fn test_install_success_runs_help() {
    let archive = tarball(&[("LICENSE", b"MIT"), ("jfrm", PASSING_BINARY)]);
    let fetcher = StaticFetcher::new(archive.clone());
    let installer = Installer::new(pinned_descriptor(&sha256_hex(&archive)), fetcher.clone());
    let temp = TempDir::new().unwrap();

    let report = installer
        .install(linux_amd64(), &InstallOptions::new(temp.path()))
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(report.name, "jfrm");
    assert_eq!(report.version, "0.0.1");
    assert_eq!(report.platform, "linux-amd64");
    assert_eq!(
        report.url,
        "https://github.com/bhanurp/jfrm/releases/download/v0.0.1/jfrm_linux_amd64.tar.gz"
    );
    assert_eq!(report.sha256, sha256_hex(&archive));
    assert_eq!(report.path, temp.path().join("jfrm"));
    assert!(report.written);
    assert_eq!(report.smoke_test, SmokeTestOutcome::Passed);
    assert_eq!(std::fs::read(&report.path).unwrap(), PASSING_BINARY);

    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(&report.path).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[tokio::test]
async fn test_checksum_mismatch_writes_nothing() {
    let archive = tarball(&[("jfrm", PASSING_BINARY)]);
    let installer = Installer::new(
        pinned_descriptor(&sha256_hex(b"something else")),
        StaticFetcher::new(archive),
    );
    let temp = TempDir::new().unwrap();
    let bin_dir = temp.path().join("bin");

    let result = installer
        .install(linux_amd64(), &InstallOptions::new(&bin_dir))
        .await;

    match result {
        Err(e @ Error::Integrity { .. }) => assert!(!e.is_unpinned()),
        other => panic!("Expected Integrity error, got {other:?}"),
    }
    assert!(!bin_dir.exists());
}

#[tokio::test]
async fn test_unpinned_checksum_fails_before_fetch() {
    let fetcher = StaticFetcher::new(tarball(&[("jfrm", PASSING_BINARY)]));
    let installer = Installer::new(FormulaDescriptor::builtin(), fetcher.clone());
    let temp = TempDir::new().unwrap();

    let result = installer
        .install(linux_amd64(), &InstallOptions::new(temp.path()))
        .await;

    match result {
        Err(e @ Error::Integrity { .. }) => {
            assert!(e.is_unpinned());
            assert!(e.to_string().contains("YOUR_SHA256_HERE"));
        }
        other => panic!("Expected Integrity error, got {other:?}"),
    }
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_sha256_override_pins_builtin() {
    let archive = tarball(&[("jfrm", PASSING_BINARY)]);
    let installer = Installer::new(FormulaDescriptor::builtin(), StaticFetcher::new(archive.clone()));
    let temp = TempDir::new().unwrap();

    let options = InstallOptions::new(temp.path())
        .with_sha256(Some(sha256_hex(&archive).to_uppercase()))
        .with_smoke_test(false);
    let report = installer.install(linux_amd64(), &options).await.unwrap();

    assert_eq!(report.smoke_test, SmokeTestOutcome::Skipped);
    assert!(temp.path().join("jfrm").exists());
}

#[tokio::test]
async fn test_unsupported_platform() {
    let mut descriptor = pinned_descriptor(&"a".repeat(64));
    descriptor
        .artifacts
        .retain(|a: &ReleaseArtifact| a.platform() != linux_amd64());
    let fetcher = StaticFetcher::new(Vec::new());
    let installer = Installer::new(descriptor, fetcher.clone());
    let temp = TempDir::new().unwrap();

    let result = installer
        .install(linux_amd64(), &InstallOptions::new(temp.path()))
        .await;

    assert!(matches!(result, Err(Error::UnsupportedPlatform { .. })));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_network_error_is_fatal() {
    let installer = Installer::new(pinned_descriptor(&"a".repeat(64)), OfflineFetcher);
    let temp = TempDir::new().unwrap();

    let result = installer
        .install(linux_amd64(), &InstallOptions::new(temp.path()))
        .await;

    assert!(matches!(result, Err(Error::Network { .. })));
}

#[tokio::test]
async fn test_missing_binary_in_archive() {
    let archive = tarball(&[("README.md", b"docs"), ("LICENSE", b"MIT")]);
    let installer = Installer::new(pinned_descriptor(&sha256_hex(&archive)), StaticFetcher::new(archive));
    let temp = TempDir::new().unwrap();

    let result = installer
        .install(linux_amd64(), &InstallOptions::new(temp.path()))
        .await;

    assert!(matches!(result, Err(Error::Install { .. })));
    assert!(!temp.path().join("jfrm").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_smoke_test_is_a_warning() {
    let archive = tarball(&[("jfrm", FAILING_BINARY)]);
    let installer = Installer::new(pinned_descriptor(&sha256_hex(&archive)), StaticFetcher::new(archive));
    let temp = TempDir::new().unwrap();

    let report = installer
        .install(linux_amd64(), &InstallOptions::new(temp.path()))
        .await
        .unwrap();

    match report.smoke_test {
        SmokeTestOutcome::Failed { message } => assert!(message.contains("exit code 3")),
        other => panic!("Expected failed smoke test, got {other:?}"),
    }
    assert!(report.path.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_strict_smoke_test_fails_without_rollback() {
    let archive = tarball(&[("jfrm", FAILING_BINARY)]);
    let installer = Installer::new(pinned_descriptor(&sha256_hex(&archive)), StaticFetcher::new(archive));
    let temp = TempDir::new().unwrap();

    let options = InstallOptions::new(temp.path()).with_strict(true);
    let result = installer.install(linux_amd64(), &options).await;

    assert!(matches!(result, Err(Error::Verification { .. })));
    assert!(temp.path().join("jfrm").exists());
}

#[tokio::test]
async fn test_reinstall_is_idempotent() {
    let archive = tarball(&[("jfrm", PASSING_BINARY)]);
    let installer = Installer::new(pinned_descriptor(&sha256_hex(&archive)), StaticFetcher::new(archive));
    let temp = TempDir::new().unwrap();
    let options = InstallOptions::new(temp.path()).with_smoke_test(false);

    let first = installer.install(linux_amd64(), &options).await.unwrap();
    let first_bytes = std::fs::read(&first.path).unwrap();
    let second = installer.install(linux_amd64(), &options).await.unwrap();
    let second_bytes = std::fs::read(&second.path).unwrap();

    assert!(first.written);
    assert!(!second.written);
    assert_eq!(first.path, second.path);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_install_over_http() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let archive = tarball(&[("jfrm", PASSING_BINARY)]);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/v0.0.1/jfrm_darwin_arm64.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let mut descriptor = pinned_descriptor(&sha256_hex(&archive));
    for artifact in &mut descriptor.artifacts {
        artifact.url = format!("{}/download/v{{version}}/jfrm_{{os}}_{{arch}}.tar.gz", server.uri());
    }
    let fetcher = HttpFetcher::new(Duration::from_secs(10))
        .unwrap()
        .with_token(None);
    let installer = Installer::new(descriptor, fetcher);
    let temp = TempDir::new().unwrap();

    let options = InstallOptions::new(temp.path()).with_smoke_test(false);
    let report = installer
        .install(Platform::parse("darwin-arm64").unwrap(), &options)
        .await
        .unwrap();

    assert_eq!(std::fs::read(report.path).unwrap(), PASSING_BINARY);
}
