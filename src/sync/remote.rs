//! Remote access for the synchronizer.
//!
//! The session only needs "GET this URL"; the [`Remote`] trait keeps the
//! HTTP client swappable so sessions can run against an in-memory remote
//! in tests.

use anyhow::{Context, Result};
use thiserror::Error;
use url::Url;

use crate::util::config::SyncConfig;

/// Failure to fetch a single URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Read-only access to the remote distribution.
pub trait Remote: Send + Sync {
    /// Fetch the body of `url`.
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;

    /// Fetch the body of `url` as text, replacing invalid UTF-8.
    fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let bytes = self.fetch(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Blocking HTTP remote with explicit connect and request timeouts.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::blocking::Client,
}

impl HttpRemote {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .user_agent(concat!("fwkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(HttpRemote { client })
    }
}

impl Remote for HttpRemote {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        tracing::trace!("GET {}", url);

        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().map_err(request_error)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().map_err(request_error)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_remote_builds_from_config() {
        let config = SyncConfig::default();
        assert!(HttpRemote::new(&config).is_ok());
    }

    #[test]
    fn test_status_error_display() {
        let err = FetchError::Status {
            url: "http://example.com/version".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "http://example.com/version returned HTTP 404");
    }
}
