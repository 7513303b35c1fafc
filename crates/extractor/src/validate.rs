// ABOUTME: URL gatekeeping and platform routing for incoming job posting URLs.
// ABOUTME: validate_url checks syntax and scheme; detect_platform maps a host to a Platform tag.

use url::Url;

use crate::error::ExtractError;
use crate::result::Platform;

/// How hosts that match no dedicated platform are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    /// Unknown hosts route to the generic parser.
    #[default]
    Fallback,
    /// Unknown hosts are rejected with an UnsupportedPlatform error.
    Strict,
}

/// Host fragments and the platform they route to, checked in order.
const PLATFORM_HOSTS: &[(&str, Platform)] = &[
    ("linkedin.com", Platform::LinkedIn),
    ("indeed.com", Platform::Indeed),
    ("angel.co", Platform::AngelList),
    ("wellfound.com", Platform::AngelList),
];

/// Validate a raw URL string. No network access happens here.
pub fn validate_url(raw: &str) -> Result<Url, ExtractError> {
    if raw.is_empty() {
        return Err(ExtractError::validation(
            raw,
            "Validate",
            Some(anyhow::anyhow!("URL is required")),
        ));
    }

    let parsed = Url::parse(raw).map_err(|e| {
        ExtractError::validation(
            raw,
            "Validate",
            Some(anyhow::anyhow!("invalid URL format: {}", e)),
        )
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ExtractError::validation(
            raw,
            "Validate",
            Some(anyhow::anyhow!("URL must use http or https protocol")),
        ));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ExtractError::validation(
            raw,
            "Validate",
            Some(anyhow::anyhow!("URL must have a valid host")),
        ));
    }

    Ok(parsed)
}

/// Lower-cased host without a leading `www.`.
fn normalized_host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Map a validated URL to the platform whose parser should handle it.
///
/// Glassdoor is deliberately absent from the host table: its pages go through
/// the generic parser like any other unrecognized site.
pub fn detect_platform(url: &Url, mode: DetectionMode) -> Result<Platform, ExtractError> {
    let host = normalized_host(url);

    if let Some((_, platform)) = PLATFORM_HOSTS
        .iter()
        .find(|(fragment, _)| host.contains(fragment))
    {
        return Ok(*platform);
    }

    match mode {
        DetectionMode::Fallback => Ok(Platform::Generic),
        DetectionMode::Strict => Err(ExtractError::unsupported_platform(
            url.as_str(),
            "Detect",
            Some(anyhow::anyhow!("platform not supported: {}", host)),
        )),
    }
}
