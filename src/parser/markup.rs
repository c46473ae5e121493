use std::sync::LazyLock;

use regex::Regex;

static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{.*?\}\}").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(?:[^|\]]+\|)?([^\]]+)\]\]").unwrap());
static REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<ref[^>/]*/>|<ref[^>]*>.*?</ref>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'{2,}").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Drop `{{…}}` templates (non-nested).
pub fn strip_templates(s: &str) -> String {
    TEMPLATE_RE.replace_all(s, "").into_owned()
}

/// `[[target|label]]` → `label`, `[[target]]` → `target`.
pub fn strip_links(s: &str) -> String {
    LINK_RE.replace_all(s, "$1").into_owned()
}

/// Remove `<ref>` footnotes and any remaining HTML-like tags.
pub fn strip_tags(s: &str) -> String {
    let without_refs = REF_RE.replace_all(s, "");
    TAG_RE.replace_all(&without_refs, "").into_owned()
}

pub fn strip_emphasis(s: &str) -> String {
    EMPHASIS_RE.replace_all(s, "").into_owned()
}

/// Templates and links reduced to display text, whitespace collapsed.
pub fn display_text(s: &str) -> String {
    let s = strip_links(&strip_templates(s));
    SPACES_RE.replace_all(s.trim(), " ").into_owned()
}

pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
