use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::FetchError;

// Camera portals tend to reject requests with an empty or library-default
// user agent, so identify as a desktop browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Fetcher { client }
    }

    /// Fetches `url` and returns the response body. Any non-success status
    /// or transport failure (DNS, timeout, refused connection) surfaces as
    /// a `FetchError`. No retries; the caller decides whether to try again.
    pub fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_returns_body_and_sends_browser_user_agent() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/cams")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .with_status(200)
            .with_body("<html><body>ok</body></html>")
            .create();

        let fetcher = Fetcher::new();
        let body = fetcher.fetch(&format!("{}/cams", server.url())).unwrap();

        assert_eq!(body, "<html><body>ok</body></html>");
        mock.assert();
    }

    #[test]
    fn fetch_surfaces_http_error_status() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/gone").with_status(404).create();

        let fetcher = Fetcher::new();
        let err = fetcher
            .fetch(&format!("{}/gone", server.url()))
            .unwrap_err();

        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("expected status error, got {other}"),
        }
    }

    #[test]
    fn fetch_surfaces_connection_failure() {
        let fetcher = Fetcher::new();
        // Discard port; nothing listens there.
        let err = fetcher.fetch("http://127.0.0.1:9/").unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
