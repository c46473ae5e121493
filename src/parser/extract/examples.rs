use std::sync::LazyLock;

use regex::Regex;

use crate::parser::markup::{display_text, strip_emphasis, strip_tags};

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:\s*\[\d[^\]]*\]\s*(.+)$").unwrap());

const SECTION_MARKER: &str = "{{Beispiele}}";
const MAX_EXAMPLES: usize = 3;
const MIN_LEN: usize = 10;
const MAX_LEN: usize = 150;

/// Numbered entries from the `{{Beispiele}}` section, cleaned, in order.
pub fn extract(text: &str) -> Vec<String> {
    let Some(start) = text.find(SECTION_MARKER) else {
        return Vec::new();
    };
    let body = &text[start + SECTION_MARKER.len()..];

    let mut examples = Vec::new();
    for line in body.lines().skip(1) {
        let line = line.trim();
        // Blank line or the next `{{…}}` heading closes the section.
        if line.is_empty() || line.starts_with("{{") || line.starts_with("==") {
            break;
        }
        let Some(caps) = ENTRY_RE.captures(line) else {
            continue;
        };
        let sentence = clean(&caps[1]);
        let len = sentence.chars().count();
        if len > MIN_LEN && len < MAX_LEN {
            examples.push(sentence);
            if examples.len() >= MAX_EXAMPLES {
                break;
            }
        }
    }

    examples
}

fn clean(raw: &str) -> String {
    strip_emphasis(&display_text(&strip_tags(raw)))
        .trim()
        .to_string()
}
