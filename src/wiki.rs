use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use crate::sanitize::sanitize;

/// Returned when no paragraph on the page passes [`is_prose`].
pub const NO_PARAGRAPH: &str = "No suitable paragraph found.";

static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#mw-content-text p").unwrap());

/// Fetch a Wikipedia page and return its first qualifying paragraph, cleaned.
/// The caller supplies the client so every page fetched in one run shares a
/// connection pool.
pub async fn first_paragraph(url: &str, http: &reqwest::Client) -> Result<String> {
    let html = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?;
    Ok(extract_first_paragraph(&html))
}

/// Walk the main-content paragraphs in document order and return the first
/// one that reads like running prose, sanitized. Scanning stops at the first
/// hit; pages with nothing suitable yield [`NO_PARAGRAPH`].
pub fn extract_first_paragraph(html: &str) -> String {
    let document = Html::parse_document(html);
    for p in document.select(&PARAGRAPHS) {
        let text = p.text().collect::<String>().trim().to_string();
        if is_prose(&text) {
            return sanitize(&text);
        }
    }
    NO_PARAGRAPH.to_string()
}

/// Prose filter: long enough to be a real paragraph, contains at least one
/// sentence, and is not a coordinates line or a bracketed/parenthesized
/// fragment (infobox leftovers usually start that way).
fn is_prose(text: &str) -> bool {
    text.chars().count() > 80
        && text.contains('.')
        && !text.starts_with('[')
        && !text.starts_with('(')
        && !text.starts_with("Coordinates")
}

// ── Tests ──
