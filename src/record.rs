use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Article {
    Der,
    Die,
    Das,
}

impl Article {
    /// Map a single-letter genus marker (m/f/n) to its article.
    pub fn from_genus(genus: &str) -> Option<Self> {
        match genus {
            "m" => Some(Self::Der),
            "f" => Some(Self::Die),
            "n" => Some(Self::Das),
            _ => None,
        }
    }

    pub fn genus(self) -> &'static str {
        match self {
            Self::Der => "m",
            Self::Die => "f",
            Self::Das => "n",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Der => "der",
            Self::Die => "die",
            Self::Das => "das",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "der" => Some(Self::Der),
            "die" => Some(Self::Die),
            "das" => Some(Self::Das),
            _ => None,
        }
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic categories, in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Tier,
    Pflanze,
    Essen,
    #[serde(rename = "Möbel")]
    Moebel,
    Schule,
    Familie,
    #[serde(rename = "Körper")]
    Koerper,
    Kleidung,
    Haus,
    Natur,
    Farbe,
    Fahrzeug,
    Werkzeug,
    Zeit,
    Zahl,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Self::Tier,
        Self::Pflanze,
        Self::Essen,
        Self::Moebel,
        Self::Schule,
        Self::Familie,
        Self::Koerper,
        Self::Kleidung,
        Self::Haus,
        Self::Natur,
        Self::Farbe,
        Self::Fahrzeug,
        Self::Werkzeug,
        Self::Zeit,
        Self::Zahl,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Tier => "Tier",
            Self::Pflanze => "Pflanze",
            Self::Essen => "Essen",
            Self::Moebel => "Möbel",
            Self::Schule => "Schule",
            Self::Familie => "Familie",
            Self::Koerper => "Körper",
            Self::Kleidung => "Kleidung",
            Self::Haus => "Haus",
            Self::Natur => "Natur",
            Self::Farbe => "Farbe",
            Self::Fahrzeug => "Fahrzeug",
            Self::Werkzeug => "Werkzeug",
            Self::Zeit => "Zeit",
            Self::Zahl => "Zahl",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inflected forms from the declension table. Nominative singular is
/// normally the page title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declension {
    pub nominative_singular: Option<String>,
    pub nominative_plural: Option<String>,
    pub genitive_singular: Option<String>,
    pub genitive_plural: Option<String>,
    pub dative_singular: Option<String>,
    pub dative_plural: Option<String>,
    pub accusative_singular: Option<String>,
    pub accusative_plural: Option<String>,
}

pub const PLURAL_ARTICLE: &str = "die";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounRecord {
    pub word: String,
    pub article: Article,
    pub plural: Option<String>,
    pub gen_singular: Option<String>,
    pub dat_singular: Option<String>,
    pub akk_singular: Option<String>,
    pub gen_plural: Option<String>,
    pub dat_plural: Option<String>,
    pub akk_plural: Option<String>,
    pub syllables: Option<String>,
    pub syllable_count: u32,
    pub category: Option<Category>,
    pub is_compound: bool,
    pub compound_parts: Option<Vec<String>>,
    pub difficulty: u8,
    pub frequency_rank: Option<u32>,
    pub example_sentences: Vec<String>,
}

impl NounRecord {
    /// Minimal record with defaults for every derived field.
    pub fn new(word: impl Into<String>, article: Article) -> Self {
        Self {
            word: word.into(),
            article,
            plural: None,
            gen_singular: None,
            dat_singular: None,
            akk_singular: None,
            gen_plural: None,
            dat_plural: None,
            akk_plural: None,
            syllables: None,
            syllable_count: 1,
            category: None,
            is_compound: false,
            compound_parts: None,
            difficulty: 1,
            frequency_rank: None,
            example_sentences: Vec::new(),
        }
    }

    pub fn plural_article(&self) -> &'static str {
        PLURAL_ARTICLE
    }

    /// Any cell of the declension table other than the nominative singular,
    /// which is the title and not stored.
    pub fn has_declension(&self) -> bool {
        [
            &self.plural,
            &self.gen_singular,
            &self.dat_singular,
            &self.akk_singular,
            &self.gen_plural,
            &self.dat_plural,
            &self.akk_plural,
        ]
        .iter()
        .any(|v| v.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genus_round_trip() {
        for g in ["m", "f", "n"] {
            assert_eq!(Article::from_genus(g).map(Article::genus), Some(g));
        }
        assert_eq!(Article::from_genus("x"), None);
    }

    #[test]
    fn category_labels_are_unique() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
        assert_eq!(Category::from_label("Möbel"), Some(Category::Moebel));
    }

    #[test]
    fn plural_alone_counts_as_declension() {
        let mut r = NounRecord::new("Banane", Article::Die);
        assert!(!r.has_declension());
        r.plural = Some("Bananen".into());
        assert!(r.has_declension());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Koerper).unwrap();
        assert_eq!(json, "\"Körper\"");
    }
}
