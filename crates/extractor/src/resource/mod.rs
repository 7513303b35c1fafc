// ABOUTME: Resource handling module for fetching job pages over HTTP.
// ABOUTME: Provides the PageFetcher seam, the retrying HttpFetcher, body size limits and charset decoding.

pub mod retry;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ExtractError;
pub use crate::resource::retry::{should_retry, RetryPolicy, RetryState, RetryStep};

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// A page body returned by a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedPage {
    /// Decode the body as UTF-8 text, honoring a charset in the content type.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Retrieves raw page bytes for parsers.
///
/// `headers` are added on top of the fetcher's defaults and win on conflict.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        cancel: &CancellationToken,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<FetchedPage, ExtractError>;
}

/// HTTP implementation of [`PageFetcher`] with timeout, retry and backoff.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
    timeout: Duration,
    headers: HashMap<String, String>,
}

impl HttpFetcher {
    /// Wrap an existing client. `timeout` is only used in error messages; the
    /// client itself must enforce it.
    pub fn new(
        client: reqwest::Client,
        retry: RetryPolicy,
        timeout: Duration,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            client,
            retry,
            timeout,
            headers,
        }
    }

    /// Build a client with the given per-attempt timeout and user agent.
    pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, ExtractError> {
        reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| {
                ExtractError::internal(
                    "",
                    "BuildClient",
                    Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                )
            })
    }

    fn request_headers(
        &self,
        url: &str,
        extra: &[(&str, &str)],
    ) -> Result<HeaderMap, ExtractError> {
        let mut map = HeaderMap::new();
        map.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        map.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));

        let configured = self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        for (key, value) in configured.chain(extra.iter().copied()) {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                ExtractError::internal(url, "Fetch", Some(anyhow::anyhow!("invalid header name {}: {}", key, e)))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ExtractError::internal(url, "Fetch", Some(anyhow::anyhow!("invalid header value for {}: {}", key, e)))
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }

    async fn fetch_once(
        &self,
        cancel: &CancellationToken,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<FetchedPage, ExtractError> {
        let request = self.client.get(url).headers(self.request_headers(url, headers)?);

        let response = tokio::select! {
            result = request.send() => result.map_err(|e| self.classify_send_error(url, e))?,
            _ = cancel.cancelled() => return Err(ExtractError::cancelled(url, "Fetch")),
        };

        let status = response.status().as_u16();
        if status != 200 {
            debug!(url, status, "non-200 response");
            return Err(status_error(url, status));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(too_large(url));
            }
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = tokio::select! {
            result = response.bytes() => result.map_err(|e| {
                if e.is_timeout() {
                    self.timeout_error(url)
                } else {
                    ExtractError::network(url, "Fetch", Some(anyhow::anyhow!("failed to read response body: {}", e)))
                }
            })?,
            _ = cancel.cancelled() => return Err(ExtractError::cancelled(url, "Fetch")),
        };

        if body.len() > MAX_CONTENT_LENGTH {
            return Err(too_large(url));
        }

        debug!(url, bytes = body.len(), "fetched page");
        Ok(FetchedPage {
            content_type,
            body,
        })
    }

    fn classify_send_error(&self, url: &str, err: reqwest::Error) -> ExtractError {
        if err.is_timeout() {
            return self.timeout_error(url);
        }
        ExtractError::network(
            url,
            "Fetch",
            Some(anyhow::anyhow!("failed to fetch URL: {}", err)),
        )
    }

    fn timeout_error(&self, url: &str) -> ExtractError {
        ExtractError::timeout(
            url,
            "Fetch",
            Some(anyhow::anyhow!("request timed out after {:?}", self.timeout)),
        )
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(
        &self,
        cancel: &CancellationToken,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<FetchedPage, ExtractError> {
        let mut state = RetryState::new(&self.retry);
        let mut last_error: Option<ExtractError> = None;
        let max_attempts = self.retry.max_attempts();

        loop {
            match state.next(cancel.is_cancelled()) {
                RetryStep::Cancelled => {
                    warn!(url, "fetch cancelled");
                    return Err(ExtractError::cancelled(url, "Fetch"));
                }
                RetryStep::Backoff(delay) => {
                    debug!(url, delay_ms = delay.as_millis() as u64, "backing off before retry");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => {
                            warn!(url, "fetch cancelled during backoff");
                            return Err(ExtractError::cancelled(url, "Fetch"));
                        }
                    }
                }
                RetryStep::Attempt(n) => match self.fetch_once(cancel, url, headers).await {
                    Ok(page) => {
                        if n > 0 {
                            debug!(url, attempt = n + 1, max_attempts, "request succeeded after retry");
                        }
                        return Ok(page);
                    }
                    Err(err) if !should_retry(&err) => {
                        debug!(url, error = %err, "non-retryable fetch error");
                        return Err(err);
                    }
                    Err(err) => {
                        warn!(url, attempt = n + 1, max_attempts, error = %err, "fetch attempt failed");
                        last_error = Some(err);
                    }
                },
                RetryStep::Exhausted => return Err(retry::exhausted(url, last_error)),
            }
        }
    }
}

/// Oversized bodies are not retried.
fn too_large(url: &str) -> ExtractError {
    ExtractError::parsing(
        url,
        "Fetch",
        Some(anyhow::anyhow!(
            "content too large (limit {} bytes)",
            MAX_CONTENT_LENGTH
        )),
    )
}

fn status_error(url: &str, status: u16) -> ExtractError {
    if status == 404 {
        return ExtractError::not_found(
            url,
            "Fetch",
            Some(anyhow::anyhow!("job posting not found")),
        );
    }
    let reason = if status >= 500 {
        format!("HTTP {}: server error", status)
    } else {
        format!("HTTP {}: failed to fetch job posting", status)
    };
    ExtractError::network(url, "Fetch", Some(anyhow::anyhow!(reason)))
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .find_map(|part| part.trim().strip_prefix("charset=").map(str::to_string))
        .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
}
