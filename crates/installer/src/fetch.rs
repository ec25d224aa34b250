//! Artifact download.
//!
//! The [`Fetcher`] trait is the seam between the pipeline and the network.
//! [`DefaultFetcher`] reads `file://` URLs and plain paths from disk and
//! sends everything else through [`HttpFetcher`].

use async_trait::async_trait;
use jfrm_core::{Error, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for a whole download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);

const USER_AGENT: &str = concat!("jfrm-install/", env!("CARGO_PKG_VERSION"));

/// Source of archive bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download the complete archive at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] on any transport failure.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches archives over HTTP(S).
pub struct HttpFetcher {
    client: Client,
    token: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    ///
    /// Picks up `GITHUB_TOKEN` (or `GH_TOKEN`) for authenticated downloads.
    /// The token is only sent to GitHub hosts, see [`is_github_host`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::network("", format!("failed to create HTTP client: {e}")))?;

        let token = std::env::var("GITHUB_TOKEN")
            .or_else(|_| std::env::var("GH_TOKEN"))
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Self { client, token })
    }

    /// Override the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "Downloading artifact");

        let parsed = Url::parse(url).map_err(|e| Error::network(url, format!("invalid URL: {e}")))?;
        let mut request = self.client.get(parsed.clone());
        if let Some(token) = &self.token
            && parsed.host_str().is_some_and(is_github_host)
        {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::network(url, format!("failed to read body: {e}")))?;

        debug!(%url, size = bytes.len(), "Downloaded artifact");
        Ok(bytes.to_vec())
    }
}

/// Hosts that may receive the GitHub token.
#[must_use]
pub fn is_github_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "github.com" || host == "api.github.com" || host.ends_with(".githubusercontent.com")
}

/// Whether `url` names a local file rather than a remote resource.
#[must_use]
pub fn is_local(url: &str) -> bool {
    url.starts_with("file:") || !url.contains("://")
}

/// Reads archives from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl FileFetcher {
    /// Map a `file:` URL or a plain path to a filesystem path.
    ///
    /// `file://localhost/...` is accepted and percent-escapes are decoded.
    /// Returns `None` for other schemes and for `file:` URLs naming a
    /// remote host.
    #[must_use]
    pub fn local_path(url: &str) -> Option<PathBuf> {
        if url.starts_with("file:") {
            return Url::parse(url).ok()?.to_file_path().ok();
        }
        if url.contains("://") {
            return None;
        }
        Some(PathBuf::from(url))
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = Self::local_path(url)
            .ok_or_else(|| Error::network(url, "not a local file URL"))?;
        debug!(?path, "Reading local artifact");
        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::network(url, e.to_string()))
    }
}

/// Dispatches to [`FileFetcher`] or [`HttpFetcher`] by URL.
pub struct DefaultFetcher {
    http: HttpFetcher,
}

impl DefaultFetcher {
    /// Create a fetcher with the given HTTP timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
        })
    }
}

#[async_trait]
impl Fetcher for DefaultFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if is_local(url) {
            FileFetcher.fetch(url).await
        } else {
            self.http.fetch(url).await
        }
    }
}
