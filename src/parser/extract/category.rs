use std::sync::LazyLock;

use regex::Regex;

use crate::parser::markup::truncate_chars;
use crate::record::Category;

const BODY_PREFIX_CHARS: usize = 1000;

/// Stem patterns per category. Order is priority: earlier entries win.
static CATEGORY_TABLE: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    [
        (Category::Tier, r"\b(tier|hund|katz|vogel|fisch|pferd|schwein|kuh|schaf|ziege|huhn|maus|hase|bär|löwe|elefant|affe)\b"),
        (Category::Pflanze, r"\b(pflanz|baum|blum|ros|tulp|gras|strauch|kraut)\b"),
        (Category::Essen, r"\b(essen|brot|käse|wurst|obst|gemüse|apfel|birn|kartoffel|reis|nudel|kuchen|keks)\b"),
        (Category::Moebel, r"\b(möbel|stuhl|tisch|bett|schrank|regal|sofa|sessel)\b"),
        (Category::Schule, r"\b(schul|lehrer|schüler|heft|buch|stift|tafel|klasse|pause|unterricht)\b"),
        (Category::Familie, r"\b(familie|mutter|vater|kind|bruder|schwester|oma|opa|tante|onkel|cousin)\b"),
        (Category::Koerper, r"\b(körper|kopf|arm|bein|hand|fuß|auge|ohr|nase|mund|haar|zahn)\b"),
        (Category::Kleidung, r"\b(kleid|hose|hemd|jacke|schuh|socke|mütze|schal|rock|pullover)\b"),
        (Category::Haus, r"\b(haus|zimmer|küch|bad|wohn|schlaf|tür|fenster|wand|dach)\b"),
        (Category::Natur, r"\b(natur|berg|fluss|see|meer|wald|wiese|himmel|sonne|mond|stern|regen|schnee)\b"),
        (Category::Farbe, r"\b(farb|rot|blau|grün|gelb|schwarz|weiß|braun|grau|orange|rosa|lila)\b"),
        (Category::Fahrzeug, r"\b(auto|fahrrad|bus|zug|schiff|flugzeug|motorrad|lkw)\b"),
        (Category::Werkzeug, r"\b(werkzeug|hammer|säge|schrauben|zange|schere)\b"),
        (Category::Zeit, r"\b(zeit|tag|woche|monat|jahr|stunde|minute|sekunde|morgen|mittag|abend|nacht)\b"),
        (Category::Zahl, r"\b(zahl|eins|zwei|drei|vier|fünf|sechs|sieben|acht|neun|zehn|hundert|tausend)\b"),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).unwrap()))
    .collect()
});

/// First category whose pattern hits the title or the start of the body.
pub fn classify(title: &str, text: Option<&str>) -> Option<Category> {
    let title = title.to_lowercase();
    let sample = text.map(|t| truncate_chars(t, BODY_PREFIX_CHARS).to_lowercase());

    CATEGORY_TABLE
        .iter()
        .find(|(_, re)| re.is_match(&title) || sample.as_deref().is_some_and(|s| re.is_match(s)))
        .map(|(category, _)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_match() {
        assert_eq!(classify("Hund", None), Some(Category::Tier));
        assert_eq!(classify("Stuhl", None), Some(Category::Moebel));
        assert_eq!(classify("Zahn", None), Some(Category::Koerper));
    }

    #[test]
    fn body_match() {
        assert_eq!(classify("Dackel", Some("ein Rassehund")), None);
        assert_eq!(classify("Dackel", Some("ein kleiner [[hund]]")), Some(Category::Tier));
    }

    #[test]
    fn earlier_category_wins() {
        // "tisch" (Möbel) and "buch" (Schule) both match; Möbel is declared first.
        for _ in 0..3 {
            assert_eq!(classify("Tisch", Some("ein buch")), Some(Category::Moebel));
        }
        assert_eq!(classify("Buch", Some("auf dem tisch")), Some(Category::Moebel));
    }

    #[test]
    fn no_category() {
        assert_eq!(classify("Glück", Some("{{f}}")), None);
    }
}
