// ABOUTME: Data model for extraction output: ExtractedJobData, the Platform tag and the Extraction wrapper.
// ABOUTME: Includes the warning texts and the minimal-viability check shared by every parser.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const WARN_TITLE: &str = "Could not extract job title";
pub const WARN_COMPANY: &str = "Could not extract company name";
pub const WARN_LOCATION: &str = "Could not extract location";
pub const WARN_DESCRIPTION: &str = "Could not extract job description";

/// Identifies which extraction strategy handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Indeed,
    /// Never produced by detection; glassdoor hosts block scrapers and are
    /// routed to the generic parser.
    Glassdoor,
    AngelList,
    #[default]
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Indeed => "indeed",
            Platform::Glassdoor => "glassdoor",
            Platform::AngelList => "angellist",
            Platform::Generic => "generic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "indeed" => Ok(Platform::Indeed),
            "glassdoor" => Ok(Platform::Glassdoor),
            "angellist" | "wellfound" => Ok(Platform::AngelList),
            "generic" => Ok(Platform::Generic),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// Structured job posting data used to pre-fill an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractedJobData {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Plain text, paragraphs separated by a blank line.
    pub description: String,
    pub platform: Platform,
    /// Normalized employment type when the source states one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_type: String,
}

impl ExtractedJobData {
    /// True when at least a title or a company was recovered.
    pub fn is_viable(&self) -> bool {
        !self.title.is_empty() || !self.company.is_empty()
    }

    /// One warning per empty field, in title, company, location, description order.
    pub fn missing_field_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.title.is_empty() {
            warnings.push(WARN_TITLE.to_string());
        }
        if self.company.is_empty() {
            warnings.push(WARN_COMPANY.to_string());
        }
        if self.location.is_empty() {
            warnings.push(WARN_LOCATION.to_string());
        }
        if self.description.is_empty() {
            warnings.push(WARN_DESCRIPTION.to_string());
        }
        warnings
    }
}

/// A successful extraction: the data plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Extraction {
    pub data: ExtractedJobData,
    pub warnings: Vec<String>,
}
