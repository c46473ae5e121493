pub mod category;
pub mod compound;
pub mod declension;
pub mod examples;
pub mod gender;
pub mod syllables;

use crate::record::{Article, Category, Declension};
use compound::Compound;
use syllables::Syllables;

pub struct ExtractedData {
    pub article: Article,
    pub declension: Declension,
    pub syllables: Syllables,
    pub category: Option<Category>,
    pub compound: Compound,
    pub examples: Vec<String>,
}

/// Run every field extractor over one page. `None` when no article can be
/// determined, since such a page cannot become a record.
pub fn extract_all(title: &str, text: &str) -> Option<ExtractedData> {
    let article = gender::extract(text)?;

    Some(ExtractedData {
        article,
        declension: declension::extract(text),
        syllables: syllables::extract(title, text),
        category: category::classify(title, Some(text)),
        compound: compound::detect(title),
        examples: examples::extract(text),
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_page(title: &str) -> String {
        let xml = std::fs::read_to_string("tests/fixtures/dump.xml").unwrap();
        crate::dump::DumpReader::new(xml.as_bytes())
            .map(|p| p.unwrap())
            .find(|p| p.title == title)
            .map(|p| p.text)
            .unwrap()
    }

    #[test]
    fn kopfnuss_fields() {
        let text = fixture_page("Kopfnuss");
        let data = extract_all("Kopfnuss", &text).unwrap();
        assert_eq!(data.article, Article::Die);
        assert_eq!(data.declension.nominative_plural.as_deref(), Some("Kopfnüsse"));
        assert_eq!(data.syllables.breakdown.as_deref(), Some("Kopf-nuss"));
        assert_eq!(data.syllables.count, 2);
        assert_eq!(data.category, Some(Category::Koerper));
        assert!(!data.compound.is_compound);
        assert_eq!(data.examples.len(), 3);
        assert_eq!(data.examples[0], "Er gab mir eine Kopfnuss.");
    }

    #[test]
    fn baum_fields() {
        let text = fixture_page("Baum");
        let data = extract_all("Baum", &text).unwrap();
        assert_eq!(data.article, Article::Der);
        assert_eq!(data.declension.dative_plural.as_deref(), Some("Bäumen"));
        assert_eq!(data.category, Some(Category::Pflanze));
        assert!(data.examples.is_empty());
    }

    #[test]
    fn verb_page_has_no_article() {
        let text = fixture_page("laufen");
        assert!(extract_all("laufen", &text).is_none());
    }
}
