// ABOUTME: The Extractor orchestrator that validates a URL, routes it to a platform parser and stamps the result.
// ABOUTME: Owns the shared HTTP fetcher and the immutable parser registry built from Options.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ExtractError;
use crate::extractors::ParserRegistry;
use crate::options::{ExtractorBuilder, Options};
use crate::resource::{HttpFetcher, PageFetcher};
use crate::result::Extraction;
use crate::validate::{detect_platform, validate_url, DetectionMode};

/// Entry point for job posting extraction.
///
/// Cheap to clone; clones share the HTTP client and the parser registry.
#[derive(Debug, Clone)]
pub struct Extractor {
    detection: DetectionMode,
    registry: Arc<ParserRegistry>,
}

impl Extractor {
    /// Create a new ExtractorBuilder for configuring the extractor.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Create a new Extractor with the given options.
    pub fn new(opts: Options) -> Result<Self, ExtractError> {
        let registry = match opts.registry {
            Some(registry) => registry,
            None => {
                let client = match opts.http_client {
                    Some(client) => client,
                    None => HttpFetcher::build_client(opts.timeout, &opts.user_agent)?,
                };
                let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(
                    client,
                    opts.retry,
                    opts.timeout,
                    opts.headers,
                ));
                Arc::new(ParserRegistry::standard(fetcher))
            }
        };

        Ok(Self {
            detection: opts.detection,
            registry,
        })
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Extract job data from `url`.
    ///
    /// Validation and platform detection fail before any network access.
    /// Parser errors are returned unchanged. On success the data carries the
    /// detected platform tag.
    pub async fn extract(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<Extraction, ExtractError> {
        let parsed = validate_url(url)?;
        let platform = detect_platform(&parsed, self.detection)?;
        debug!(url, platform = %platform, "detected platform");

        let parser = self.registry.get(platform).ok_or_else(|| {
            ExtractError::internal(
                url,
                "Extract",
                Some(anyhow::anyhow!("no parser available for platform {}", platform)),
            )
        })?;

        let mut extraction = parser.fetch_and_parse(cancel, url).await?;
        extraction.data.platform = platform;

        info!(
            url,
            platform = %platform,
            warnings = extraction.warnings.len(),
            "extracted job posting"
        );
        Ok(extraction)
    }
}
