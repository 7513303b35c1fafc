// ABOUTME: End-to-end parser tests that run saved job pages through the Extractor and standard registry.
// ABOUTME: A fixture-backed PageFetcher stands in for the network and records the URLs each parser requests.

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use ditto_extractor::{
    CancellationToken, ExtractError, Extractor, FetchedPage, PageFetcher, ParserRegistry, Platform,
};
use pretty_assertions::assert_eq;

/// Load an HTML snapshot from the fixtures directory.
fn load_html_fixture(name: &str) -> String {
    let path = format!(
        "{}/tests/fixtures/html/{}.html",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {}", path, e))
}

#[derive(Default)]
struct FixtureFetcher {
    requested: Mutex<Vec<String>>,
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch_page(
        &self,
        _cancel: &CancellationToken,
        url: &str,
        _headers: &[(&str, &str)],
    ) -> Result<FetchedPage, ExtractError> {
        self.requested.lock().unwrap().push(url.to_string());
        let fixture = if url.contains("linkedin.com/jobs-guest/") {
            "linkedin_job"
        } else if url.starts_with("https://www.indeed.com/viewjob") {
            "indeed_job"
        } else if url.contains("wellfound.com") {
            "wellfound_job"
        } else {
            "generic_job"
        };
        Ok(FetchedPage {
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: Bytes::from(load_html_fixture(fixture)),
        })
    }
}

fn extractor() -> (Extractor, Arc<FixtureFetcher>) {
    let fetcher = Arc::new(FixtureFetcher::default());
    let registry = ParserRegistry::standard(fetcher.clone());
    let extractor = Extractor::builder()
        .registry(Arc::new(registry))
        .build()
        .unwrap();
    (extractor, fetcher)
}

#[tokio::test]
async fn linkedin_guest_page() {
    let (extractor, fetcher) = extractor();
    let extraction = extractor
        .extract(
            &CancellationToken::new(),
            "https://www.linkedin.com/jobs/search/?keywords=platform&currentJobId=4095728488",
        )
        .await
        .unwrap();

    assert_eq!(
        fetcher.requested.lock().unwrap().clone(),
        vec!["https://www.linkedin.com/jobs-guest/jobs/api/jobPosting/4095728488".to_string()]
    );

    let data = &extraction.data;
    assert_eq!(data.platform, Platform::LinkedIn);
    assert_eq!(data.title, "Platform Engineer");
    assert_eq!(data.company, "Northwind Traders");
    assert_eq!(data.location, "Seattle, WA");
    assert_eq!(data.job_type, "contract");
    assert!(data.description.starts_with("About the role\n\nNorthwind is hiring"));
    assert!(data.description.contains("Operate Kubernetes clusters"));
    assert!(data.description.ends_with("Apply at our careers site."));
    assert!(!data.description.contains("\n\n\n"));
    assert!(!data.description.contains("track()"));
    assert!(extraction.warnings.is_empty());
}

#[tokio::test]
async fn indeed_search_page_uses_json_ld() {
    let (extractor, fetcher) = extractor();
    let extraction = extractor
        .extract(
            &CancellationToken::new(),
            "https://www.indeed.com/jobs?q=software+engineer&l=Greenville%2C+SC&vjk=0db8a5f21010e5ec",
        )
        .await
        .unwrap();

    assert_eq!(
        fetcher.requested.lock().unwrap().clone(),
        vec!["https://www.indeed.com/viewjob?jk=0db8a5f21010e5ec".to_string()]
    );

    let data = &extraction.data;
    assert_eq!(data.platform, Platform::Indeed);
    assert_eq!(data.title, "Software Engineer");
    assert_eq!(data.company, "Palmetto Systems");
    assert_eq!(data.location, "Greenville, SC, US");
    assert_eq!(
        data.description,
        "Join the payments team.\n\nWrite Go and Rust services\nParticipate in on-call"
    );
    assert!(extraction.warnings.is_empty());
}

#[tokio::test]
async fn wellfound_next_data() {
    let (extractor, _) = extractor();
    let extraction = extractor
        .extract(
            &CancellationToken::new(),
            "https://wellfound.com/jobs/884211-founding-engineer",
        )
        .await
        .unwrap();

    let data = &extraction.data;
    assert_eq!(data.platform, Platform::AngelList);
    assert_eq!(data.title, "Founding Engineer");
    assert_eq!(data.company, "Lumen Labs");
    assert_eq!(data.location, "Remote");
    assert_eq!(
        data.description,
        "Lumen Labs builds tooling for solar installers.\n\nYou will:\n\nShip the first version of our field app\nSet up our data platform"
    );
    assert!(extraction.warnings.is_empty());
}

#[tokio::test]
async fn generic_careers_page_uses_heuristics() {
    let (extractor, _) = extractor();
    let extraction = extractor
        .extract(
            &CancellationToken::new(),
            "https://careers.harbor.example/openings/robotics-technician",
        )
        .await
        .unwrap();

    let data = &extraction.data;
    assert_eq!(data.platform, Platform::Generic);
    assert_eq!(data.title, "Robotics Technician");
    assert_eq!(data.company, "Harbor Robotics");
    assert_eq!(data.location, "Portland, OR");
    assert!(data
        .description
        .starts_with("Maintain and calibrate our warehouse robots."));
    assert!(data.description.contains("Comfortable reading schematics"));
    assert!(!data.description.contains("analytics"));
    assert!(extraction.warnings.is_empty());
}

#[tokio::test]
async fn glassdoor_routes_to_generic() {
    let (extractor, _) = extractor();
    let extraction = extractor
        .extract(
            &CancellationToken::new(),
            "https://www.glassdoor.com/job-listing/robotics-technician-JV_IC1.htm?jl=1009",
        )
        .await
        .unwrap();
    assert_eq!(extraction.data.platform, Platform::Generic);
    assert_eq!(extraction.data.title, "Robotics Technician");
}
