use std::sync::LazyLock;

use regex::Regex;

use crate::parser::markup::{strip_tags, strip_templates};

static WORTTRENNUNG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{Worttrennung\}\}\s*:([^\n]+)").unwrap());

const SEPARATOR: char = '·';
const DIPHTHONGS: &[&str] = &["ei", "ai", "au", "eu", "äu", "ie", "oi", "ui"];
const VOWELS: &str = "aeiouäöüy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllables {
    pub breakdown: Option<String>,
    pub count: u32,
}

/// Hyphenation from the `{{Worttrennung}}` line, else a vowel-count guess.
pub fn extract(title: &str, text: &str) -> Syllables {
    match annotated(text) {
        Some(first) => Syllables {
            count: first.matches(SEPARATOR).count() as u32 + 1,
            breakdown: Some(first.replace(SEPARATOR, "-")),
        },
        None => Syllables {
            breakdown: None,
            count: count_syllables(title),
        },
    }
}

fn annotated(text: &str) -> Option<String> {
    let caps = WORTTRENNUNG_RE.captures(text)?;
    let line = strip_templates(&strip_tags(&caps[1]));
    let first = line.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Vowel groups after collapsing diphthongs; never below 1.
pub fn count_syllables(word: &str) -> u32 {
    let mut lower = word.to_lowercase();
    for d in DIPHTHONGS {
        lower = lower.replace(d, "X");
    }
    let vowels = lower.chars().filter(|c| VOWELS.contains(*c)).count() as u32;
    vowels.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diphthongs_collapse_before_counting() {
        assert_eq!(count_syllables("Baum"), 1);
        assert_eq!(count_syllables("Banane"), 3);
        assert_eq!(count_syllables("Tomate"), 3);
    }

    #[test]
    fn never_zero() {
        assert_eq!(count_syllables(""), 1);
        assert_eq!(count_syllables("Psst"), 1);
    }

    #[test]
    fn worttrennung_first_variant() {
        let text = "{{Worttrennung}}\n:Kopf·nuss, {{Pl.}} Kopf·nüs·se\n";
        let s = extract("Kopfnuss", text);
        assert_eq!(s.breakdown.as_deref(), Some("Kopf-nuss"));
        assert_eq!(s.count, 2);
    }

    #[test]
    fn single_syllable_annotation() {
        let s = extract("Hund", "{{Worttrennung}}\n:Hund, {{Pl.}} Hun·de\n");
        assert_eq!(s.breakdown.as_deref(), Some("Hund"));
        assert_eq!(s.count, 1);
    }

    #[test]
    fn falls_back_to_vowels() {
        let s = extract("Banane", "{{m}}");
        assert_eq!(s, Syllables { breakdown: None, count: 3 });
    }
}
