// ABOUTME: HTML sanitization and plain-text conversion shared by every job parser.
// ABOUTME: Holds the process-wide ammonia policy and the description/single-line text normalizers.

//! Output format helpers.
//!
//! Descriptions arrive as untrusted HTML from third-party pages. They are run
//! through [`sanitize_html`] and then flattened with [`html_to_text`], which
//! keeps paragraph and list structure as newlines. Single-line fields such as
//! title or company go through [`clean_text`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::Html;

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "hr", "strong", "b", "em", "i", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul",
    "ol", "li", "blockquote", "pre", "code", "a", "span", "div",
];

/// Tags dropped together with everything inside them.
const STRIPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "noscript", "textarea", "select",
];

/// Sanitizer policy, built on first use and never mutated afterwards.
static POLICY: Lazy<ammonia::Builder<'static>> = Lazy::new(|| {
    let mut builder = ammonia::Builder::new();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect::<HashSet<_>>())
        .clean_content_tags(STRIPPED_WITH_CONTENT.iter().copied().collect::<HashSet<_>>())
        .url_schemes(["http", "https", "mailto"].iter().copied().collect())
        .link_rel(Some("nofollow noreferrer"));

    builder.add_tag_attributes("a", &["href"]);
    builder.add_tag_attributes("div", &["class"]);
    builder.add_tag_attributes("span", &["class"]);
    builder.add_tag_attributes("ul", &["type"]);
    builder.add_tag_attributes("ol", &["type"]);
    builder
});

/// Matches a serialized anchor start tag. Attribute values are always
/// double-quoted with `"` escaped, so `"[^"]*"` is exact.
static ANCHOR_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<a((?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*(?:="[^"]*")?)*)\s*>"#).unwrap()
});
static ABSOLUTE_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bhref="https?://"#).unwrap());

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static LI_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</li\s*>").unwrap());
static BLOCK_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</(?:p|div)\s*>").unwrap());
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static NEWLINE_EDGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\n ?").unwrap());
static MULTI_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Sanitize untrusted HTML down to a small formatting whitelist.
///
/// Scripts, styles, frames, embeds and forms are removed with their content,
/// event-handler attributes and `javascript:` targets disappear, and every
/// anchor gets `rel="nofollow noreferrer"`. Absolute http(s) links also open
/// in a new tab.
pub fn sanitize_html(html: &str) -> String {
    let cleaned = POLICY.clean(html).to_string();
    ANCHOR_START_RE
        .replace_all(&cleaned, |caps: &Captures| {
            let attrs = &caps[1];
            if ABSOLUTE_HREF_RE.is_match(attrs) {
                format!(r#"<a{} target="_blank">"#, attrs)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Convert description HTML to plain text.
///
/// `<br>` and `</li>` become single newlines, `</p>` and `</div>` become
/// paragraph breaks, remaining tags are stripped, whitespace is collapsed and
/// at most one blank line separates paragraphs.
pub fn html_to_text(html: &str) -> String {
    let marked = BR_RE.replace_all(html, "\n");
    let marked = LI_CLOSE_RE.replace_all(&marked, "\n");
    let marked = BLOCK_CLOSE_RE.replace_all(&marked, "\n\n");

    let fragment = Html::parse_fragment(&marked);
    let raw: String = fragment.root_element().text().collect();

    let unified = raw.replace("\r\n", "\n");
    let spaced = HSPACE_RE.replace_all(&unified, " ");
    let tight = NEWLINE_EDGE_RE.replace_all(&spaced, "\n");
    let collapsed = MULTI_NEWLINE_RE.replace_all(&tight, "\n\n");

    collapsed.trim().to_string()
}

/// Collapse whitespace runs to single spaces and trim, for one-line fields.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitize then flatten, the pipeline every parser applies to descriptions.
pub fn description_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    html_to_text(&sanitize_html(html))
}
