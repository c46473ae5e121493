pub mod extract;
pub mod filter;
pub mod markup;
pub mod score;

use tracing::debug;

use crate::dump::Page;
use crate::record::NounRecord;

const NOUN_SECTION: &str = "{{Wortart|Substantiv|Deutsch}}";

/// What became of one page.
#[derive(Debug)]
pub enum Outcome {
    Accepted(Box<NounRecord>),
    /// Rejected by the appropriateness filter.
    Inappropriate,
    /// No genus marker found.
    NoArticle,
    /// No German noun section (only checked with the noun gate on).
    NotNoun,
}

pub fn is_german_noun(text: &str) -> bool {
    text.contains(NOUN_SECTION)
}

/// gate → filter → extractors → scores → record.
pub fn process_page(page: &Page, nouns_only: bool) -> Outcome {
    if nouns_only && !is_german_noun(&page.text) {
        return Outcome::NotNoun;
    }
    if !filter::is_appropriate(&page.title, &page.text) {
        return Outcome::Inappropriate;
    }
    let Some(data) = extract::extract_all(&page.title, &page.text) else {
        return Outcome::NoArticle;
    };

    let decl = data.declension;
    if decl.nominative_singular.as_deref().is_some_and(|ns| ns != page.title) {
        debug!("{}: table lemma is {:?}", page.title, decl.nominative_singular);
    }

    let word = page.title.clone();
    let mut record = NounRecord::new(word, data.article);

    record.plural = decl.nominative_plural;
    record.gen_singular = decl.genitive_singular;
    record.dat_singular = decl.dative_singular;
    record.akk_singular = decl.accusative_singular;
    record.gen_plural = decl.genitive_plural;
    record.dat_plural = decl.dative_plural;
    record.akk_plural = decl.accusative_plural;

    record.syllables = data.syllables.breakdown;
    record.syllable_count = data.syllables.count;
    record.category = data.category;
    record.is_compound = data.compound.is_compound;
    record.compound_parts = data.compound.parts;
    record.difficulty = score::difficulty(&record.word, record.syllable_count);
    record.frequency_rank = Some(score::frequency_rank(&record.word));
    record.example_sentences = data.examples;

    Outcome::Accepted(Box::new(record))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Article, Category};

    fn page(title: &str, text: &str) -> Page {
        Page { title: title.to_string(), text: text.to_string() }
    }

    fn accepted(outcome: Outcome) -> NounRecord {
        match outcome {
            Outcome::Accepted(record) => *record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn hund_without_table() {
        let p = page("Hund", "=== {{Wortart|Substantiv|Deutsch}}, {{m}} ===\n");
        let r = accepted(process_page(&p, false));
        assert_eq!(r.word, "Hund");
        assert_eq!(r.article, Article::Der);
        assert_eq!(r.plural, None);
        assert_eq!(r.difficulty, 1);
        assert!(!r.is_compound);
        assert_eq!(r.syllable_count, 1);
        assert_eq!(r.category, Some(Category::Tier));
        assert_eq!(r.frequency_rank, Some(400));
        assert!(!r.has_declension());
    }

    #[test]
    fn denylisted_title_rejected_regardless_of_body() {
        let p = page("Waffenschein", "{{Genus|m}} ein ganz harmloser Text");
        assert!(matches!(process_page(&p, false), Outcome::Inappropriate));
    }

    #[test]
    fn missing_article() {
        let p = page("laufen", "=== {{Wortart|Verb|Deutsch}} ===");
        assert!(matches!(process_page(&p, false), Outcome::NoArticle));
    }

    #[test]
    fn noun_gate() {
        let p = page("Tisch", "{{Genus|m}}");
        assert!(matches!(process_page(&p, true), Outcome::NotNoun));
        assert!(matches!(process_page(&p, false), Outcome::Accepted(_)));
    }

    #[test]
    fn long_title_is_compound_without_parts() {
        let p = page("Schmetterling", "{{Genus|m}}");
        let r = accepted(process_page(&p, false));
        assert!(r.is_compound);
        assert_eq!(r.compound_parts, None);
    }

    #[test]
    fn fixture_kopfnuss_record() {
        let xml = std::fs::read_to_string("tests/fixtures/dump.xml").unwrap();
        let p = crate::dump::DumpReader::new(xml.as_bytes())
            .map(|p| p.unwrap())
            .find(|p| p.title == "Kopfnuss")
            .unwrap();
        let r = accepted(process_page(&p, true));
        assert_eq!(r.article, Article::Die);
        assert_eq!(r.plural.as_deref(), Some("Kopfnüsse"));
        assert_eq!(r.dat_plural.as_deref(), Some("Kopfnüssen"));
        assert_eq!(r.syllables.as_deref(), Some("Kopf-nuss"));
        // (8/4 + 2) / 2 = 2
        assert_eq!(r.difficulty, 2);
        assert_eq!(r.example_sentences.len(), 3);
    }
}
