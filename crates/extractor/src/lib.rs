// ABOUTME: Main library entry point for the ditto job posting extractor.
// ABOUTME: Re-exports the public API: Extractor, ExtractorBuilder, Options, Extraction, ExtractError, ErrorCode, Platform.

//! Ditto extractor - structured job data from job posting URLs.
//!
//! Given a URL, the extractor validates it, picks a platform parser
//! (LinkedIn, Indeed, Wellfound or a generic JSON-LD/heuristic parser),
//! fetches the page with retries and returns title, company, location and a
//! plain-text description plus warnings for anything it could not find.
//!
//! # Example
//!
//! ```no_run
//! use ditto_extractor::{ExtractError, Extractor};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExtractError> {
//!     let extractor = Extractor::builder().build()?;
//!     let cancel = CancellationToken::new();
//!     let extraction = extractor
//!         .extract(&cancel, "https://www.linkedin.com/jobs/view/4095728488")
//!         .await?;
//!     println!("{} at {}", extraction.data.title, extraction.data.company);
//!     for warning in &extraction.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod extractors;
pub mod formats;
pub mod options;
pub mod resource;
pub mod result;
pub mod validate;

pub use crate::client::Extractor;
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractors::{JobParser, ParserRegistry};
pub use crate::options::{ExtractorBuilder, Options};
pub use crate::resource::{FetchedPage, HttpFetcher, PageFetcher, RetryPolicy};
pub use crate::result::{ExtractedJobData, Extraction, Platform};
pub use crate::validate::{detect_platform, validate_url, DetectionMode};
pub use tokio_util::sync::CancellationToken;
