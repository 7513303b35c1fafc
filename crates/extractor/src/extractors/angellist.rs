// ABOUTME: Wellfound (formerly AngelList) job parser reading the Next.js Apollo cache embedded in the page.
// ABOUTME: Falls back to the generic JSON-LD and heuristic extraction over the same document.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::extractors::{finish, generic, JobParser};
use crate::formats::{clean_text, description_text};
use crate::resource::PageFetcher;
use crate::result::{ExtractedJobData, Extraction, Platform};

const REFERER: &str = "https://wellfound.com/";

#[derive(Debug, Deserialize)]
struct NextData {
    props: NextProps,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextProps {
    page_props: PageProps,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageProps {
    apollo_state: Map<String, Value>,
}

pub struct AngelListParser {
    fetcher: Arc<dyn PageFetcher>,
}

impl AngelListParser {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl JobParser for AngelListParser {
    fn platform(&self) -> Platform {
        Platform::AngelList
    }

    async fn fetch_and_parse(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<Extraction, ExtractError> {
        let page = self
            .fetcher
            .fetch_page(cancel, url, &[("Referer", REFERER)])
            .await?;
        parse_page(&page.text_utf8(), url)
    }
}

fn parse_page(html: &str, url: &str) -> Result<Extraction, ExtractError> {
    let doc = Html::parse_document(html);

    let mut data = match apollo_state(&doc).map(|state| extract_from_apollo_state(&state)) {
        Some(data) if data.is_viable() => data,
        _ => {
            warn!(url, "no job listing in Wellfound page data, using generic extraction");
            generic::extract_from_document(&doc, url)
        }
    };
    data.platform = Platform::AngelList;
    finish(data, url, "Parse")
}

/// The Apollo cache from `script#__NEXT_DATA__`, if present and well formed.
fn apollo_state(doc: &Html) -> Option<Map<String, Value>> {
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;
    let script = doc.select(&selector).next()?;
    let text = script.text().collect::<String>();
    match serde_json::from_str::<NextData>(&text) {
        Ok(next) => Some(next.props.page_props.apollo_state),
        Err(e) => {
            debug!(error = %e, "unusable __NEXT_DATA__ payload");
            None
        }
    }
}

fn is_job_entry(key: &str, typename: &str) -> bool {
    typename == "JobListing" || typename == "JobPost" || key.contains("JobListing")
}

fn is_company_entry(key: &str, typename: &str) -> bool {
    typename == "Startup" || typename == "Company" || key.contains("Startup")
}

/// Walk the cache entries; each field keeps the first non-empty value seen.
fn extract_from_apollo_state(state: &Map<String, Value>) -> ExtractedJobData {
    let mut data = ExtractedJobData::default();
    let mut description_html = String::new();

    for (key, value) in state {
        let Some(entry) = value.as_object() else {
            continue;
        };
        let typename = entry
            .get("__typename")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let text = |field: &str| {
            entry
                .get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        if is_job_entry(key, typename) {
            if data.title.is_empty() {
                data.title = text("title").map(clean_text).unwrap_or_default();
            }
            if description_html.is_empty() {
                description_html = text("description").unwrap_or_default().to_string();
            }
            if data.location.is_empty() {
                data.location = entry
                    .get("locationNames")
                    .and_then(Value::as_array)
                    .and_then(|names| names.first())
                    .and_then(Value::as_str)
                    .map(clean_text)
                    .unwrap_or_default();
            }
        }

        if is_company_entry(key, typename) && data.company.is_empty() {
            data.company = text("name").map(clean_text).unwrap_or_default();
        }
    }

    data.description = description_text(&description_html);
    data
}
