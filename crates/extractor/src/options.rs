// ABOUTME: Configuration options for the job extractor including Options and ExtractorBuilder.
// ABOUTME: ExtractorBuilder provides a fluent API for constructing Extractor instances with custom settings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::client::Extractor;
use crate::error::ExtractError;
use crate::extractors::ParserRegistry;
use crate::resource::{RetryPolicy, DEFAULT_USER_AGENT};
use crate::validate::DetectionMode;

/// Configuration options for the extractor.
#[derive(Debug, Clone)]
pub struct Options {
    /// Per-attempt request timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Extra headers sent with every request. Parser-specific headers such as
    /// `Referer` still win over these.
    pub headers: HashMap<String, String>,
    pub retry: RetryPolicy,
    pub detection: DetectionMode,
    pub http_client: Option<reqwest::Client>,
    pub registry: Option<Arc<ParserRegistry>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
            retry: RetryPolicy::default(),
            detection: DetectionMode::Fallback,
            http_client: None,
            registry: None,
        }
    }
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    opts: Options,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Replace the backoff table. An empty table disables retries.
    pub fn retry_backoff(mut self, backoff: Vec<Duration>) -> Self {
        self.opts.retry = RetryPolicy::new(backoff);
        self
    }

    pub fn detection(mut self, mode: DetectionMode) -> Self {
        self.opts.detection = mode;
        self
    }

    /// Reject hosts with no dedicated parser instead of using the generic one.
    pub fn strict(self, strict: bool) -> Self {
        let mode = if strict {
            DetectionMode::Strict
        } else {
            DetectionMode::Fallback
        };
        self.detection(mode)
    }

    /// Use a custom HTTP client. Timeout and user agent are then the client's own.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Use a custom parser registry instead of the standard one.
    pub fn registry(mut self, registry: Arc<ParserRegistry>) -> Self {
        self.opts.registry = Some(registry);
        self
    }

    /// Build the Extractor with the configured options.
    pub fn build(self) -> Result<Extractor, ExtractError> {
        Extractor::new(self.opts)
    }
}
