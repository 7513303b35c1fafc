// ABOUTME: schema.org JobPosting model and discovery of JSON-LD blocks in job pages.
// ABOUTME: Tolerates the shapes seen in the wild: arrays, @graph containers, string or object locations.

use scraper::{Html, Selector};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::formats::{clean_text, description_text};
use crate::result::{ExtractedJobData, Platform};

/// Accepts a JSON string and maps any other shape to an empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

/// The subset of a schema.org `JobPosting` this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostingSchema {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// HTML.
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default)]
    pub hiring_organization: Option<HiringOrganization>,
    #[serde(default)]
    pub job_location: Option<JobLocation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HiringOrganization {
    Name(String),
    Named {
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
    },
    Other(Value),
}

impl HiringOrganization {
    pub fn name(&self) -> &str {
        match self {
            HiringOrganization::Name(name) | HiringOrganization::Named { name } => name.as_str(),
            HiringOrganization::Other(_) => "",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobLocation {
    List(Vec<Place>),
    Single(Place),
    Other(Value),
}

impl JobLocation {
    /// The display location: first place of a list, else the single place.
    pub fn display(&self) -> String {
        match self {
            JobLocation::List(places) => places.first().map(Place::display).unwrap_or_default(),
            JobLocation::Single(place) => place.display(),
            JobLocation::Other(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl Place {
    /// Locality, region and country joined with ", "; falls back to `name`.
    pub fn display(&self) -> String {
        let parts = match &self.address {
            Some(Address::Postal(postal)) => postal.parts(),
            Some(Address::Text(text)) if !text.trim().is_empty() => vec![text.trim()],
            _ => Vec::new(),
        };
        if parts.is_empty() {
            return self.name.clone();
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Address {
    Text(String),
    Postal(PostalAddress),
    Other(Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default, deserialize_with = "lenient_string")]
    pub address_locality: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address_region: String,
    #[serde(default)]
    pub address_country: Option<Country>,
}

impl PostalAddress {
    fn parts(&self) -> Vec<&str> {
        let country = self.address_country.as_ref().map(Country::name).unwrap_or("");
        [
            self.address_locality.as_str(),
            self.address_region.as_str(),
            country,
        ]
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Country {
    Code(String),
    Named {
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
    },
    Other(Value),
}

impl Country {
    fn name(&self) -> &str {
        match self {
            Country::Code(name) | Country::Named { name } => name.as_str(),
            Country::Other(_) => "",
        }
    }
}

impl JobPostingSchema {
    /// Map the schema onto job data. The platform is left at its default.
    pub fn to_job_data(&self) -> ExtractedJobData {
        ExtractedJobData {
            title: clean_text(&self.title),
            company: clean_text(
                self.hiring_organization
                    .as_ref()
                    .map(HiringOrganization::name)
                    .unwrap_or(""),
            ),
            location: clean_text(
                &self
                    .job_location
                    .as_ref()
                    .map(JobLocation::display)
                    .unwrap_or_default(),
            ),
            description: description_text(&self.description),
            platform: Platform::default(),
            job_type: String::new(),
        }
    }
}

/// Find the first JobPosting in the document's JSON-LD scripts, in document order.
///
/// Scripts that fail to parse are skipped. Within a script the top-level
/// value, the elements of a top-level array and the members of `@graph` are
/// considered.
pub fn find_job_posting(doc: &Html) -> Option<JobPostingSchema> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    for script in doc.select(&selector) {
        let text = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            debug!("skipping unparseable JSON-LD block");
            continue;
        };
        if let Some(found) = find_job_posting_value(&value) {
            match serde_json::from_value::<JobPostingSchema>(found.clone()) {
                Ok(schema) => return Some(schema),
                Err(e) => debug!(error = %e, "JobPosting block did not match the schema model"),
            }
        }
    }
    None
}

fn find_job_posting_value(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if map
                .get("@type")
                .is_some_and(|t| matches_type(t, "JobPosting"))
            {
                return Some(value);
            }
            map.get("@graph").and_then(find_job_posting_value)
        }
        Value::Array(items) => items.iter().find_map(find_job_posting_value),
        _ => None,
    }
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Array(arr) => arr.iter().any(|v| matches_type(v, expected)),
        _ => false,
    }
}
