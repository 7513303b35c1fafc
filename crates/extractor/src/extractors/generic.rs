// ABOUTME: Fallback parser for arbitrary job pages using JSON-LD first and HTML heuristics second.
// ABOUTME: Also exposes the document-level extraction reused by platform parsers that fall back to it.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ExtractError;
use crate::extractors::fields::{extract_first_inner_html, extract_first_text};
use crate::extractors::{finish, jsonld, JobParser};
use crate::formats::description_text;
use crate::resource::PageFetcher;
use crate::result::{ExtractedJobData, Extraction, Platform};

const TITLE_SELECTORS: &[&str] = &[
    "h1[class*='title']",
    "h1[class*='job']",
    "h1[id*='title']",
    "h1[id*='job']",
    "h2[class*='title']",
    "h2[class*='job']",
    "meta[property='og:title']",
    "title",
];

const COMPANY_SELECTORS: &[&str] = &[
    "[class*='company']",
    "[id*='company']",
    "[data-company]",
    "a[class*='employer']",
    "span[class*='employer']",
    "meta[property='og:site_name']",
];

const LOCATION_SELECTORS: &[&str] = &[
    "[class*='location']",
    "[id*='location']",
    "[data-location]",
    "[class*='city']",
    "[class*='address']",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "[class*='description']",
    "[id*='description']",
    "[class*='job-details']",
    "[class*='job-content']",
    "article",
    "main",
];

/// Parser for any host without a dedicated strategy.
pub struct GenericParser {
    fetcher: Arc<dyn PageFetcher>,
}

impl GenericParser {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl JobParser for GenericParser {
    fn platform(&self) -> Platform {
        Platform::Generic
    }

    async fn fetch_and_parse(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<Extraction, ExtractError> {
        debug!(url, "using generic parser");
        let page = self.fetcher.fetch_page(cancel, url, &[]).await?;
        parse_page(&page.text_utf8(), url)
    }
}

fn parse_page(html: &str, url: &str) -> Result<Extraction, ExtractError> {
    let doc = Html::parse_document(html);
    let mut data = extract_from_document(&doc, url);
    data.platform = Platform::Generic;
    finish(data, url, "Parse")
}

/// JSON-LD JobPosting when it names a title or company, otherwise HTML heuristics.
///
/// The choice is made for the whole document; fields are never mixed between
/// the two sources.
pub(crate) fn extract_from_document(doc: &Html, url: &str) -> ExtractedJobData {
    if let Some(schema) = jsonld::find_job_posting(doc) {
        let data = schema.to_job_data();
        if data.is_viable() {
            debug!(url, "extracted job data from JSON-LD");
            return data;
        }
        debug!(url, "JSON-LD JobPosting has neither title nor company");
    }
    debug!(url, "falling back to HTML heuristics");
    extract_from_html(doc)
}

fn extract_from_html(doc: &Html) -> ExtractedJobData {
    ExtractedJobData {
        title: extract_first_text(doc, TITLE_SELECTORS).unwrap_or_default(),
        company: extract_first_text(doc, COMPANY_SELECTORS).unwrap_or_default(),
        location: extract_first_text(doc, LOCATION_SELECTORS).unwrap_or_default(),
        description: extract_first_inner_html(doc, DESCRIPTION_SELECTORS)
            .map(|html| description_text(&html))
            .unwrap_or_default(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::testing::StaticFetcher;
    use crate::result::{WARN_COMPANY, WARN_DESCRIPTION, WARN_LOCATION, WARN_TITLE};
    use pretty_assertions::assert_eq;

    async fn run(html: &str) -> Result<Extraction, ExtractError> {
        let parser = GenericParser::new(Arc::new(StaticFetcher::new(html)));
        parser
            .fetch_and_parse(&CancellationToken::new(), "https://example.com/job/1")
            .await
    }

    #[tokio::test]
    async fn json_ld_full_data() {
        let html = r#"<!DOCTYPE html><html><head>
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@type": "JobPosting",
                "title": "Senior Software Engineer",
                "description": "<p>Join our team</p><ul><li>Rust</li><li>Go</li></ul>",
                "hiringOrganization": {"@type": "Organization", "name": "Tech Corp"},
                "jobLocation": {"@type": "Place", "address": {"@type": "PostalAddress", "addressLocality": "San Francisco", "addressRegion": "CA", "addressCountry": "US"}}
            }
            </script></head><body></body></html>"#;
        let extraction = run(html).await.unwrap();
        let data = &extraction.data;
        assert_eq!(data.title, "Senior Software Engineer");
        assert_eq!(data.company, "Tech Corp");
        assert_eq!(data.location, "San Francisco, CA, US");
        assert_eq!(data.description, "Join our team\n\nRust\nGo");
        assert_eq!(data.platform, Platform::Generic);
        assert!(extraction.warnings.is_empty());
    }

    #[tokio::test]
    async fn json_ld_location_without_country() {
        let html = r#"<html><head><script type="application/ld+json">
            {
                "@type": "JobPosting",
                "title": "Senior Software Engineer",
                "description": "<p>Join our team</p>",
                "hiringOrganization": {"name": "Tech Corp"},
                "jobLocation": {"address": {"addressLocality": "San Francisco", "addressRegion": "CA"}}
            }
            </script></head><body></body></html>"#;
        let extraction = run(html).await.unwrap();
        assert_eq!(extraction.data.location, "San Francisco, CA");
        assert!(extraction.warnings.is_empty());
    }

    #[tokio::test]
    async fn json_ld_partial_data_warns() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "JobPosting", "title": "Product Manager", "hiringOrganization": {"name": "Startup Inc"}}
            </script></head><body></body></html>"#;
        let extraction = run(html).await.unwrap();
        assert_eq!(extraction.data.title, "Product Manager");
        assert_eq!(extraction.data.company, "Startup Inc");
        assert_eq!(extraction.warnings, vec![WARN_LOCATION, WARN_DESCRIPTION]);
    }

    #[tokio::test]
    async fn json_ld_array_location_takes_first() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "JobPosting", "title": "Data Scientist", "description": "Work with data",
             "hiringOrganization": {"name": "Data Corp"},
             "jobLocation": [
                {"@type": "Place", "address": {"addressLocality": "New York", "addressRegion": "NY"}},
                {"@type": "Place", "address": {"addressLocality": "Boston", "addressRegion": "MA"}}
             ]}
            </script></head><body></body></html>"#;
        let extraction = run(html).await.unwrap();
        assert_eq!(extraction.data.location, "New York, NY");
        assert!(extraction.warnings.is_empty());
    }

    #[tokio::test]
    async fn html_heuristics_success() {
        let html = r#"<!DOCTYPE html><html><head><title>Job at Company</title></head><body>
            <h1 class="job-title">Backend Developer</h1>
            <span class="company-name">Web Solutions Ltd</span>
            <div class="location">Remote</div>
            <div class="job-description">
                <p>We are looking for a backend developer</p>
                <ul><li>Build APIs</li></ul>
            </div>
        </body></html>"#;
        let extraction = run(html).await.unwrap();
        let data = &extraction.data;
        assert_eq!(data.title, "Backend Developer");
        assert_eq!(data.company, "Web Solutions Ltd");
        assert_eq!(data.location, "Remote");
        assert!(data.description.contains("looking for a backend developer"));
        assert!(data.description.contains("Build APIs"));
        assert!(extraction.warnings.is_empty());
    }

    #[tokio::test]
    async fn html_heuristics_partial_data() {
        let html = r#"<html><head></head><body>
            <h1 id="job-title">DevOps Engineer</h1>
            <article><p>Manage infrastructure and deployments</p></article>
        </body></html>"#;
        let extraction = run(html).await.unwrap();
        assert_eq!(extraction.data.title, "DevOps Engineer");
        assert!(extraction.data.description.contains("infrastructure"));
        assert_eq!(extraction.warnings, vec![WARN_COMPANY, WARN_LOCATION]);
    }

    #[tokio::test]
    async fn article_json_ld_without_job_data_fails() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@context": "https://schema.org", "@type": "Article", "headline": "Not a job posting"}
            </script></head><body><p>This is just an article</p></body></html>"#;
        let err = run(html).await.unwrap_err();
        assert!(err.is_parsing());
    }

    #[tokio::test]
    async fn scripts_and_frames_never_reach_description() {
        let html = r#"<html><head></head><body>
            <h1 class="job-title">Security Engineer</h1>
            <span class="company-name">Secure Corp</span>
            <div class="job-description">
                <p>Secure systems and protect data</p>
                <script>alert('xss')</script>
                <iframe src='bad.com'></iframe>
            </div>
        </body></html>"#;
        let extraction = run(html).await.unwrap();
        let description = &extraction.data.description;
        assert!(description.contains("Secure systems"));
        assert!(!description.contains("<script>"));
        assert!(!description.contains("alert"));
        assert!(!description.contains("<iframe"));
    }

    #[tokio::test]
    async fn meta_tags_fill_title_and_company() {
        let html = r#"<html><head>
            <meta property="og:title" content="UX Designer Position" />
            <meta property="og:site_name" content="Design Studio" />
        </head><body><div class="job-description">Create beautiful interfaces</div></body></html>"#;
        let extraction = run(html).await.unwrap();
        assert_eq!(extraction.data.title, "UX Designer Position");
        assert_eq!(extraction.data.company, "Design Studio");
        assert_eq!(extraction.data.description, "Create beautiful interfaces");
        assert_eq!(extraction.warnings, vec![WARN_LOCATION]);
    }

    #[tokio::test]
    async fn company_only_json_ld_gives_three_warnings() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@context": "https://schema.org", "@type": "JobPosting", "hiringOrganization": {"@type": "Organization", "name": "Minimal Corp"}}
            </script></head><body></body></html>"#;
        let extraction = run(html).await.unwrap();
        assert_eq!(extraction.data.company, "Minimal Corp");
        assert_eq!(
            extraction.warnings,
            vec![WARN_TITLE, WARN_LOCATION, WARN_DESCRIPTION]
        );
    }

    #[tokio::test]
    async fn empty_json_ld_falls_back_to_heuristics() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "JobPosting", "description": "<p>ignored</p>"}
            </script></head><body><h1 class="title">Heuristic Title</h1></body></html>"#;
        let extraction = run(html).await.unwrap();
        assert_eq!(extraction.data.title, "Heuristic Title");
        assert_eq!(extraction.data.description, "");
    }

    #[tokio::test]
    async fn fetches_without_extra_headers() {
        let fetcher = Arc::new(StaticFetcher::new("<html><head><title>T</title></head></html>"));
        let parser = GenericParser::new(fetcher.clone());
        parser
            .fetch_and_parse(&CancellationToken::new(), "https://example.com/job/9")
            .await
            .unwrap();
        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://example.com/job/9");
        assert!(requests[0].1.is_empty());
    }
}
