//! HTTP client for the search engine.
//!
//! [`BingClient`] is built once from an immutable configuration and shared
//! by every keyword task. Transient failures (connection errors, timeouts
//! and the statuses in `http.retry.status_forcelist`) are retried from a
//! single budget of `http.retry.total` attempts with exponential backoff.

use crate::backend::SearchBackend;
use crate::error::{Result, ScanError};
use crate::url_builder::build_search_url;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serptrack_core::{HttpConfig, SearchConfig};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Statuses whose `Retry-After` header is honoured.
const RETRY_AFTER_STATUSES: [StatusCode; 2] =
    [StatusCode::TOO_MANY_REQUESTS, StatusCode::SERVICE_UNAVAILABLE];

/// Search engine client with bounded automatic retry.
#[derive(Debug, Clone)]
pub struct BingClient {
    client: Client,
    search: SearchConfig,
    http: HttpConfig,
}

impl BingClient {
    /// Build a client from the search and HTTP settings.
    pub fn new(search: SearchConfig, http: HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&http.user_agent)
            .map_err(|e| ScanError::Client(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .timeout(http.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ScanError::Client(e.to_string()))?;

        Ok(Self {
            client,
            search,
            http,
        })
    }

    /// GET `url` and return the body, retrying transient failures.
    pub async fn get_with_retry(&self, url: &Url) -> Result<String> {
        let policy = &self.http.retry;
        let mut retries = 0;

        loop {
            let failure = match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(|source| ScanError::Request {
                            url: url.to_string(),
                            source,
                        });
                    }

                    if !policy.is_retryable(Method::GET.as_str(), status.as_u16()) {
                        return Err(ScanError::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    if retries >= policy.total {
                        return Err(ScanError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: retries,
                            last_status: status.as_u16(),
                        });
                    }

                    let server_delay = if policy.respect_retry_after {
                        retry_after(status, response.headers())
                    } else {
                        None
                    };
                    (format!("HTTP {status}"), server_delay)
                }
                Err(source) => {
                    if !is_transient(&source) || retries >= policy.total {
                        return Err(ScanError::Request {
                            url: url.to_string(),
                            source,
                        });
                    }
                    (source.to_string(), None)
                }
            };

            retries += 1;
            let (reason, server_delay) = failure;
            let delay = server_delay.unwrap_or_else(|| policy.backoff(retries));
            warn!(
                url = %url,
                retry = retries,
                total = policy.total,
                "request failed ({reason}), retrying in {delay:?}"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SearchBackend for BingClient {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String> {
        let url = build_search_url(&self.search, keyword, page)?;
        debug!(url = %url, "fetching results page");
        self.get_with_retry(&url).await
    }

    fn name(&self) -> &str {
        "bing"
    }
}

/// Errors worth another attempt: the server was never reached or was slow.
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// Delay requested by the server through `Retry-After` (seconds form only).
fn retry_after(status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
    if !RETRY_AFTER_STATUSES.contains(&status) {
        return None;
    }
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
