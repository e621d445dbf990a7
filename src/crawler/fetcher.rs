//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with user agent and bounded timeouts
//! - GET requests and status classification
//! - Parsing successful responses into a document tree

use crate::config::{HttpConfig, UserAgentConfig};
use crate::HarvestError;
use reqwest::{redirect::Policy, Client};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the request ran into the configured timeout
        timed_out: bool,
    },
}

/// A successfully fetched and parsed page
pub struct FetchedPage {
    /// URL the document was served from (after redirects)
    pub url: Url,
    pub document: Html,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `http` - Timeout settings
/// * `user_agent` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use blog_harvester::config::{HttpConfig, UserAgentConfig};
/// use blog_harvester::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "BlogHarvester".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&HttpConfig::default(), &user_agent).unwrap();
/// ```
pub fn build_http_client(
    http: &HttpConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(http.request_timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs a single GET and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success |
/// | any other status | HttpError |
/// | timeout | NetworkError (timed_out) |
/// | connect / body failure | NetworkError |
///
/// No retries are attempted.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                    timed_out: true,
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                    timed_out: false,
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                    timed_out: false,
                }
            };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            timed_out: e.is_timeout(),
            error: e.to_string(),
        },
    }
}

/// Fetches pages and remembers the last one that succeeded
///
/// The remembered URL is the base for the `source_url` of records extracted
/// from the most recent document.
pub struct PageFetcher {
    client: Client,
    last_url: Option<Url>,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            last_url: None,
        }
    }

    /// Final URL of the last successful fetch
    pub fn last_url(&self) -> Option<&Url> {
        self.last_url.as_ref()
    }

    /// Fetches and parses a page
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - 2xx response parsed into a document
    /// * `Err(HarvestError::FetchUnavailable)` - Non-success status, timeout or network failure
    pub async fn fetch_page(&mut self, url: &Url) -> Result<FetchedPage, HarvestError> {
        match fetch_url(&self.client, url.as_str()).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                let final_url = Url::parse(&final_url).unwrap_or_else(|_| url.clone());
                tracing::info!(url = %final_url, status_code, "GET");

                let document = Html::parse_document(&body);
                self.last_url = Some(final_url.clone());

                Ok(FetchedPage {
                    url: final_url,
                    document,
                })
            }
            FetchResult::HttpError { status_code } => Err(HarvestError::FetchUnavailable {
                url: url.to_string(),
                reason: format!("HTTP {}", status_code),
            }),
            FetchResult::NetworkError { error, timed_out } => {
                let reason = if timed_out {
                    "timed out".to_string()
                } else {
                    error
                };
                Err(HarvestError::FetchUnavailable {
                    url: url.to_string(),
                    reason,
                })
            }
        }
    }

    /// Fetches a page, logging and swallowing unavailability
    ///
    /// Returns `None` when the page could not be retrieved; the caller treats
    /// the page as absent.
    pub async fn fetch_document(&mut self, url: &Url) -> Option<FetchedPage> {
        match self.fetch_page(url).await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::error!("Failed: could not access {}: {}", url, e);
                None
            }
        }
    }
}
