// ABOUTME: Indeed job parser that normalizes search and view URLs to the canonical viewjob page.
// ABOUTME: Reads the JobPosting JSON-LD first and falls back to Indeed's own page selectors.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::ExtractError;
use crate::extractors::fields::{extract_first_inner_html, extract_first_text};
use crate::extractors::{finish, jsonld, JobParser};
use crate::formats::description_text;
use crate::resource::PageFetcher;
use crate::result::{ExtractedJobData, Extraction, Platform};

const VIEW_JOB_URL: &str = "https://www.indeed.com/viewjob";
const REFERER: &str = "https://www.indeed.com/";

const TITLE_SELECTORS: &[&str] = &["h1.jobsearch-JobInfoHeader-title, h2.jobTitle"];
const COMPANY_SELECTORS: &[&str] = &[
    ".jobsearch-InlineCompanyRating-companyHeader a, .jobsearch-CompanyInfoContainer a",
];
const LOCATION_SELECTORS: &[&str] = &[".jobsearch-JobInfoHeader-subtitle div"];
const DESCRIPTION_SELECTORS: &[&str] = &["#jobDescriptionText, .jobsearch-jobDescriptionText"];

/// Rewrite an Indeed URL to `https://www.indeed.com/viewjob?jk=<key>`.
///
/// The job key comes from `jk`, or from `vjk` on search result pages.
pub fn normalize_indeed_url(raw: &str) -> Result<String, ExtractError> {
    let parsed = Url::parse(raw).map_err(|e| {
        ExtractError::validation(
            raw,
            "Parse",
            Some(anyhow::anyhow!("invalid Indeed URL format: {}", e)),
        )
    })?;

    let query_value = |name: &str| {
        parsed
            .query_pairs()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    };

    let job_key = query_value("jk").or_else(|| query_value("vjk")).ok_or_else(|| {
        ExtractError::validation(
            raw,
            "Parse",
            Some(anyhow::anyhow!(
                "could not find job ID in Indeed URL (expected jk= or vjk=)"
            )),
        )
    })?;

    let normalized = Url::parse_with_params(VIEW_JOB_URL, &[("jk", job_key.as_str())]).map_err(
        |e| ExtractError::internal(raw, "Parse", Some(anyhow::anyhow!("failed to build Indeed URL: {}", e))),
    )?;
    Ok(normalized.to_string())
}

pub struct IndeedParser {
    fetcher: Arc<dyn PageFetcher>,
}

impl IndeedParser {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl JobParser for IndeedParser {
    fn platform(&self) -> Platform {
        Platform::Indeed
    }

    async fn fetch_and_parse(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<Extraction, ExtractError> {
        let normalized = normalize_indeed_url(url)?;
        if normalized != url {
            debug!(from = url, to = %normalized, "normalized Indeed URL");
        }

        let page = self
            .fetcher
            .fetch_page(cancel, &normalized, &[("Referer", REFERER)])
            .await?;
        parse_page(&page.text_utf8(), url)
    }
}

fn parse_page(html: &str, url: &str) -> Result<Extraction, ExtractError> {
    let doc = Html::parse_document(html);

    let mut data = match jsonld::find_job_posting(&doc).map(|schema| schema.to_job_data()) {
        Some(data) if data.is_viable() => {
            debug!(url, "extracted Indeed job data from JSON-LD");
            data
        }
        _ => {
            debug!(url, "no usable JSON-LD, using Indeed selectors");
            extract_from_html(&doc)
        }
    };
    data.platform = Platform::Indeed;
    finish(data, url, "Parse")
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
