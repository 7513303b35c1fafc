// ABOUTME: LinkedIn job parser that reads the public guest job posting endpoint.
// ABOUTME: Extracts the numeric job ID from view or search URLs and normalizes the employment type.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ExtractError;
use crate::extractors::fields::{extract_first_inner_html, extract_first_text, extract_text_within};
use crate::extractors::{finish, JobParser};
use crate::formats::description_text;
use crate::resource::PageFetcher;
use crate::result::{ExtractedJobData, Extraction, Platform};

const GUEST_POSTING_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting/";
const REFERER: &str = "https://www.linkedin.com/jobs/search";

static VIEW_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/jobs/view/(\d+)").unwrap());
static CURRENT_JOB_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]currentJobId=(\d+)").unwrap());

/// Pull the numeric job ID out of a LinkedIn job URL.
///
/// `/jobs/view/<id>` is preferred over a `currentJobId` query parameter.
pub fn extract_linkedin_job_id(url: &str) -> Option<String> {
    [&*VIEW_ID_RE, &*CURRENT_JOB_ID_RE]
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Map a free-form employment type to `full-time`, `part-time`, `contract`,
/// `internship`, or empty when none applies.
pub fn normalize_job_type(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let normalized = if lower.contains("full-time") || lower.contains("full time") {
        "full-time"
    } else if lower.contains("part-time") || lower.contains("part time") {
        "part-time"
    } else if lower.contains("contract") {
        "contract"
    } else if lower.contains("intern") {
        "internship"
    } else {
        ""
    };
    normalized.to_string()
}

pub struct LinkedInParser {
    fetcher: Arc<dyn PageFetcher>,
}

impl LinkedInParser {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl JobParser for LinkedInParser {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn fetch_and_parse(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<Extraction, ExtractError> {
        let job_id = extract_linkedin_job_id(url).ok_or_else(|| {
            ExtractError::validation(
                url,
                "Parse",
                Some(anyhow::anyhow!("invalid LinkedIn job URL format")),
            )
        })?;
        debug!(url, job_id = %job_id, "extracted LinkedIn job id");

        let guest_url = format!("{}{}", GUEST_POSTING_URL, job_id);
        let page = self
            .fetcher
            .fetch_page(cancel, &guest_url, &[("Referer", REFERER)])
            .await?;
        parse_page(&page.text_utf8(), url)
    }
}

fn parse_page(html: &str, url: &str) -> Result<Extraction, ExtractError> {
    let doc = Html::parse_document(html);
    let data = ExtractedJobData {
        title: extract_first_text(&doc, &[".top-card-layout__title"]).unwrap_or_default(),
        company: extract_first_text(&doc, &[".top-card-layout__card a.topcard__org-name-link"])
            .unwrap_or_default(),
        location: extract_first_text(&doc, &[".top-card-layout__card .topcard__flavor--bullet"])
            .unwrap_or_default(),
        description: extract_first_inner_html(&doc, &[".show-more-less-html__markup"])
            .map(|html| description_text(&html))
            .unwrap_or_default(),
        platform: Platform::LinkedIn,
        job_type: employment_type(&doc),
    };
    finish(data, url, "Parse")
}

/// Employment type from the job criteria list, normalized.
fn employment_type(doc: &Html) -> String {
    let Ok(item_sel) = Selector::parse(".description__job-criteria-item") else {
        return String::new();
    };
    doc.select(&item_sel)
        .find(|item| {
            extract_text_within(item, ".description__job-criteria-subheader")
                .is_some_and(|h| h.to_lowercase().contains("employment type"))
        })
        .and_then(|item| extract_text_within(&item, ".description__job-criteria-text"))
        .map(|text| normalize_job_type(&text))
        .unwrap_or_default()
}
