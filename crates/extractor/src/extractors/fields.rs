// ABOUTME: Selector helpers shared by the job parsers for text and inner HTML lookups.
// ABOUTME: Each helper tries a prioritized list of CSS selectors and returns the first non-empty match.

//! Field extraction utilities.
//!
//! Key behaviors:
//! - Selectors are tried in order; first non-empty match wins.
//! - Every element matched by a selector is considered, not only the first.
//! - `meta[...]` selectors read the `content` attribute instead of text.
//! - Invalid selectors are skipped.

use scraper::{ElementRef, Html, Selector};

use crate::formats::clean_text;

fn parse_selector(sel_str: &str) -> Option<Selector> {
    Selector::parse(sel_str).ok()
}

/// Normalized text of an element, or its `content` attribute for meta tags.
fn element_text(el: &ElementRef<'_>) -> String {
    if el.value().name() == "meta" {
        return clean_text(el.value().attr("content").unwrap_or_default());
    }
    clean_text(&el.text().collect::<String>())
}

/// Extracts normalized text from the first selector that yields a non-empty result.
pub fn extract_first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for &sel_str in selectors {
        let Some(sel) = parse_selector(sel_str) else {
            continue;
        };
        for el in doc.select(&sel) {
            let text = element_text(&el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Extracts normalized text from an element nested under `root`.
pub fn extract_text_within(root: &ElementRef<'_>, selector: &str) -> Option<String> {
    let sel = parse_selector(selector)?;
    root.select(&sel)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

/// Extracts the raw inner HTML of the first match whose text is not blank.
///
/// Used for descriptions, which are sanitized and flattened by the caller.
pub fn extract_first_inner_html(doc: &Html, selectors: &[&str]) -> Option<String> {
    for &sel_str in selectors {
        let Some(sel) = parse_selector(sel_str) else {
            continue;
        };
        for el in doc.select(&sel) {
            if el.text().any(|t| !t.trim().is_empty()) {
                return Some(el.inner_html());
            }
        }
    }
    None
}
