// ABOUTME: Job parser strategies and the immutable registry that maps platforms to them.
// ABOUTME: Defines the JobParser trait, ParserRegistry and the finishing rule shared by every parser.

//! Parser strategy set.
//!
//! Each platform has one [`JobParser`] that fetches the page it needs and
//! turns it into [`ExtractedJobData`]. Parsers are collected once into a
//! [`ParserRegistry`], which has no mutating API and is shared behind an
//! `Arc`.

pub mod angellist;
pub mod fields;
pub mod generic;
pub mod indeed;
pub mod jsonld;
pub mod linkedin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ExtractError;
use crate::resource::PageFetcher;
use crate::result::{ExtractedJobData, Extraction, Platform};

pub use angellist::AngelListParser;
pub use generic::GenericParser;
pub use indeed::IndeedParser;
pub use linkedin::LinkedInParser;

/// A platform-specific extraction strategy.
#[async_trait]
pub trait JobParser: Send + Sync {
    /// The platform this parser is registered under.
    fn platform(&self) -> Platform;

    /// Fetch whatever the platform needs for `url` and extract job data.
    async fn fetch_and_parse(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<Extraction, ExtractError>;
}

/// Immutable lookup from platform tag to parser.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<Platform, Arc<dyn JobParser>>,
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut platforms: Vec<&str> = self.parsers.keys().map(Platform::as_str).collect();
        platforms.sort_unstable();
        f.debug_struct("ParserRegistry")
            .field("platforms", &platforms)
            .finish()
    }
}

impl ParserRegistry {
    /// LinkedIn, Indeed, AngelList and Generic parsers over one fetcher.
    pub fn standard(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::from_parsers([
            Arc::new(LinkedInParser::new(fetcher.clone())) as Arc<dyn JobParser>,
            Arc::new(IndeedParser::new(fetcher.clone())),
            Arc::new(AngelListParser::new(fetcher.clone())),
            Arc::new(GenericParser::new(fetcher)),
        ])
    }

    /// Build a registry keyed by each parser's own platform. Later parsers
    /// replace earlier ones for the same platform.
    pub fn from_parsers<I>(parsers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn JobParser>>,
    {
        let parsers = parsers
            .into_iter()
            .map(|parser| (parser.platform(), parser))
            .collect();
        Self { parsers }
    }

    pub fn get(&self, platform: Platform) -> Option<&Arc<dyn JobParser>> {
        self.parsers.get(&platform)
    }

    pub fn contains(&self, platform: Platform) -> bool {
        self.parsers.contains_key(&platform)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

/// Apply the minimal-viability gate and collect missing-field warnings.
///
/// Title and company both empty is a ParsingFailed error with no data.
pub fn finish(data: ExtractedJobData, url: &str, op: &str) -> Result<Extraction, ExtractError> {
    if !data.is_viable() {
        return Err(ExtractError::parsing(
            url,
            op,
            Some(anyhow::anyhow!(
                "failed to extract minimal job data (title or company)"
            )),
        ));
    }
    let warnings = data.missing_field_warnings();
    Ok(Extraction { data, warnings })
}
