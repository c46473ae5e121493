use std::sync::LazyLock;

use regex::Regex;

use crate::record::Article;

/// Genus markers, tried in order; the first hit decides.
static GENUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\{\{Genus\|([mfn])\}\}",
        r"\|Genus=([mfn])",
        r"\{\{([mfn])\}\}",
        r"===.*?\{\{([mfn])\}\}.*?===",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub fn extract(text: &str) -> Option<Article> {
    GENUS_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| Article::from_genus(&caps[1]))
}
