use super::markup::truncate_chars;

const DENYLIST: &[&str] = &[
    "sex", "sexu", "porno", "abtreibung", "drog", "waffe", "krieg", "gewalt", "tot", "mord",
    "atom", "nuklear", "philosophie", "metaph", "epistem", "ontolog",
];

const BODY_PREFIX_CHARS: usize = 500;
const MAX_TITLE_CHARS: usize = 20;
const MAX_HYPHENS: usize = 2;

/// Audience check on title and the start of the body. Rejection is final.
pub fn is_appropriate(title: &str, body: &str) -> bool {
    let title_lower = title.to_lowercase();
    let body_lower = truncate_chars(body, BODY_PREFIX_CHARS).to_lowercase();

    if DENYLIST
        .iter()
        .any(|kw| title_lower.contains(kw) || body_lower.contains(kw))
    {
        return false;
    }

    title.chars().count() <= MAX_TITLE_CHARS && title.matches('-').count() <= MAX_HYPHENS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_noun_passes() {
        assert!(is_appropriate("Hund", "{{m}} Ein Tier."));
    }

    #[test]
    fn denylisted_title_rejected_regardless_of_body() {
        assert!(!is_appropriate("Waffenschein", ""));
        assert!(!is_appropriate("Waffenschein", "harmloser Text"));
        assert!(!is_appropriate("KRIEGSSCHIFF", "ok"));
    }

    #[test]
    fn denylisted_word_in_body_prefix() {
        assert!(!is_appropriate("Panzer", "Ein Fahrzeug im Krieg"));
        let late = format!("{}krieg", "x".repeat(600));
        assert!(is_appropriate("Panzer", &late));
    }

    #[test]
    fn long_titles_rejected() {
        assert!(!is_appropriate("Donaudampfschifffahrt", ""));
        assert!(is_appropriate("Schmetterling", ""));
    }

    #[test]
    fn hyphen_limit() {
        assert!(is_appropriate("A-B-C", ""));
        assert!(!is_appropriate("A-B-C-D", ""));
    }
}
