/// Titles longer than this are treated as compounds even without an
/// interior capital. Shared by the parse and enrich passes.
pub const COMPOUND_MIN_CHARS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub is_compound: bool,
    /// Only set when the split found two or more parts.
    pub parts: Option<Vec<String>>,
}

pub fn detect(title: &str) -> Compound {
    let is_compound =
        title.chars().count() > COMPOUND_MIN_CHARS || title.chars().skip(1).any(char::is_uppercase);
    let parts = if is_compound { split(title) } else { None };
    Compound { is_compound, parts }
}

/// Split before every interior uppercase letter. Parts are trimmed.
pub fn split(title: &str) -> Option<Vec<String>> {
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, c) in title.chars().enumerate() {
        if i > 0 && c.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }

    let parts: Vec<String> = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if parts.len() >= 2 {
        Some(parts)
    } else {
        None
    }
}
