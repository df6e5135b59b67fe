use std::sync::LazyLock;

use regex::Regex;

// Applied in order; each rule works on the previous rule's output.
static CITATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[[^\]]*\]").unwrap());
static PRONUNCIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*[/ˈˌ][^)]*\)").unwrap());
static SHORT_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]{1,25}\)").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Clean one paragraph of Wikipedia prose:
/// 1. drop citation markers like `[1]` or `[note 2]`,
/// 2. drop pronunciation parentheticals (anything with `/`, `ˈ` or `ˌ`),
/// 3. drop short parentheticals of 25 characters or fewer (birth years,
///    glosses); longer ones are kept verbatim,
/// 4. collapse whitespace runs to a single space.
///
/// Idempotent: running it on its own output changes nothing.
pub fn sanitize(text: &str) -> String {
    let cleaned = CITATION_RE.replace_all(text, "");
    let cleaned = PRONUNCIATION_RE.replace_all(&cleaned, "");
    let cleaned = SHORT_PAREN_RE.replace_all(&cleaned, "");
    WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string()
}

// ── Tests ──
