//! HTTP content fetching with a fixed timeout
//!
//! Retrieves raw page HTML and hands it to the extractor. One fetch per
//! workflow invocation; no retries, no caching.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::config::ContentFetchConfig;
use super::extractor::{extract_candidates, Candidate};

/// Content fetch error types
#[derive(Debug, Clone)]
pub enum FetchError {
    /// Request timed out
    Timeout(String),
    /// HTTP request error
    HttpError(String),
    /// HTTP non-success status
    HttpStatus(u16, String),
    /// URL could not be parsed or uses an unsupported scheme
    InvalidUrl(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout(url) => write!(f, "Timeout fetching: {}", url),
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::HttpStatus(code, url) => write!(f, "HTTP {} for: {}", code, url),
            Self::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
        }
    }
}

impl std::error::Error for FetchError {}

/// Fetches pages and extracts content candidates from them.
pub struct ContentFetcher {
    client: Client,
    config: ContentFetchConfig,
}

impl ContentFetcher {
    /// Create a new content fetcher
    pub fn new(config: ContentFetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Fetch a page and extract its content candidates.
    ///
    /// The returned list is never empty: when nothing qualifying is found the
    /// extractor's sentinel candidate stands in. Network failures and
    /// non-success statuses abort with a [`FetchError`].
    pub async fn fetch_candidates(&self, url: &str) -> Result<Vec<Candidate>, FetchError> {
        Self::check_url(url)?;

        debug!("Fetching content from: {}", url);

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(url.to_string())
                } else {
                    FetchError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16(), url.to_string()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::HttpError(e.to_string()))?;

        let candidates = extract_candidates(&html);

        info!(
            "Extracted {} content candidate(s) from: {}",
            candidates.len(),
            url
        );

        Ok(candidates)
    }

    /// Validate that a URL parses and uses http/https.
    fn check_url(url: &str) -> Result<(), FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &ContentFetchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_url_valid() {
        assert!(ContentFetcher::check_url("https://example.com/page").is_ok());
        assert!(ContentFetcher::check_url("http://example.com/essays?page=2").is_ok());
    }

    #[test]
    fn test_check_url_rejects_other_schemes() {
        assert!(ContentFetcher::check_url("ftp://example.com/file").is_err());
        assert!(ContentFetcher::check_url("file:///etc/passwd").is_err());
        assert!(ContentFetcher::check_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_check_url_rejects_garbage() {
        assert!(matches!(
            ContentFetcher::check_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetcher_creation() {
        let fetcher = ContentFetcher::new(ContentFetchConfig::default());
        assert_eq!(fetcher.config().timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_fails_fast() {
        let fetcher = ContentFetcher::new(ContentFetchConfig::default());
        let result = fetcher.fetch_candidates("nonsense").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
