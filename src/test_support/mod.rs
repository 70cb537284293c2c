//! Test utilities and mocks for fwkit unit tests.
//!
//! Provides an in-memory [`MockRemote`] standing in for the HTTP
//! repository and a [`FirmwareFixture`] that lays out a firmware root in a
//! temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use fwkit::test_support::{FirmwareFixture, MockHttpResponse, MockRemote};
//!
//! #[test]
//! fn test_example() {
//!     let fw = FirmwareFixture::new().with_core();
//!     fw.add_library("Motor", &["motor.c"]);
//!
//!     let mut remote = MockRemote::new();
//!     remote.mock_url("http://repo/version", MockHttpResponse::ok("1\n1 ide@r7\n"));
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Mutex;

use url::Url;

use crate::sync::remote::{FetchError, Remote};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock HTTP response.
#[derive(Debug, Clone)]
pub struct MockHttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockHttpResponse {
    /// Create a successful response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        MockHttpResponse {
            status: 200,
            body: body.into(),
        }
    }

    /// Create a not found response.
    pub fn not_found() -> Self {
        MockHttpResponse {
            status: 404,
            body: b"Not Found".to_vec(),
        }
    }

    /// Create a server error response.
    pub fn server_error(message: &str) -> Self {
        MockHttpResponse {
            status: 500,
            body: message.as_bytes().to_vec(),
        }
    }

    /// Check if this is a successful response.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// In-memory remote repository.
///
/// URLs are matched exactly; unmatched URLs get the default response, or
/// 404 when none is set. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockRemote {
    responses: HashMap<String, MockHttpResponse>,
    requests: Mutex<Vec<String>>,
    default_response: Option<MockHttpResponse>,
}

impl MockRemote {
    /// Create a new mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for a URL.
    pub fn mock_url(&mut self, url: &str, response: MockHttpResponse) -> &mut Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Set a default response for unmatched URLs.
    pub fn set_default(&mut self, response: MockHttpResponse) -> &mut Self {
        self.default_response = Some(response);
        self
    }

    /// All requested URLs, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Remote for MockRemote {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());

        let response = self
            .responses
            .get(url.as_str())
            .or(self.default_response.as_ref())
            .cloned()
            .unwrap_or_else(MockHttpResponse::not_found);

        if response.is_success() {
            Ok(response.body)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_remote() {
        let mut remote = MockRemote::new();
        remote.mock_url("http://repo/version", MockHttpResponse::ok("1\n1 ide@r7\n"));

        let url = Url::parse("http://repo/version").unwrap();
        assert_eq!(remote.fetch_text(&url).unwrap(), "1\n1 ide@r7\n");

        let missing = Url::parse("http://repo/missing").unwrap();
        assert!(matches!(
            remote.fetch(&missing),
            Err(FetchError::Status { status: 404, .. })
        ));

        assert_eq!(
            remote.requests(),
            vec!["http://repo/version", "http://repo/missing"]
        );
    }

    #[test]
    fn test_mock_remote_default() {
        let mut remote = MockRemote::new();
        remote.set_default(MockHttpResponse::server_error("down"));

        let url = Url::parse("http://repo/anything").unwrap();
        assert!(matches!(
            remote.fetch(&url),
            Err(FetchError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn test_firmware_fixture() {
        let fw = FirmwareFixture::new().with_core();
        fw.add_library("Motor", &["motor.c"]);

        let layout = fw.layout();
        assert!(layout.startup_code().is_file());
        assert!(layout.linker_script().is_file());
        assert!(layout.stm_lib_src_dir().join("misc.c").is_file());
        assert!(layout.library_dir("Motor").join("Motor.h").is_file());
        assert!(layout.library_dir("Motor").join("motor.c").is_file());
    }
}
