//! Schema source fetcher: resolve a schema reference to raw schema text.
//!
//! URLs are fetched over HTTP with a configurable connect timeout and
//! redirect following; anything else is read as a local file. Failed fetches
//! are never retried — a failed fetch is a terminal, reported error for the
//! document that needed it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::{Client, redirect};
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::resolver::is_http_url;

/// Configuration for the schema fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Connect timeout for remote schema requests.
    pub timeout: Duration,
    /// Accept invalid TLS certificates. Explicit opt-in only.
    pub ignore_tls_errors: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            ignore_tls_errors: false,
        }
    }
}

/// Fetches raw schema text from a URL or local path.
pub struct SchemaFetcher {
    client: Client,
    fetches: AtomicUsize,
}

impl SchemaFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .redirect(redirect::Policy::limited(10))
            .danger_accept_invalid_certs(config.ignore_tls_errors)
            .user_agent(concat!("validate-config/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ValidationError::from)?;

        Ok(Self {
            client,
            fetches: AtomicUsize::new(0),
        })
    }

    /// Fetch the raw text behind a schema reference.
    pub async fn fetch(&self, reference: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if is_http_url(reference) {
            self.fetch_url(reference).await
        } else {
            self.read_file(Path::new(reference)).await
        }
    }

    /// Number of fetches performed so far. The schema cache keeps this at one
    /// per distinct reference; tests observe it.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn fetch_url(&self, url: &str) -> Result<String> {
        info!(url, "fetching schema");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(ValidationError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(ValidationError::from)
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        debug!(path = %path.display(), "reading schema file");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|error| match error.kind() {
                std::io::ErrorKind::NotFound => ValidationError::FileNotFound {
                    path: PathBuf::from(path),
                },
                _ => ValidationError::Io(error),
            })
    }
}
