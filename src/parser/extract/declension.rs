use std::sync::LazyLock;

use regex::Regex;

use crate::parser::markup::display_text;
use crate::record::Declension;

#[derive(Clone, Copy)]
enum Slot {
    NomSg,
    NomPl,
    GenSg,
    GenPl,
    DatSg,
    DatPl,
    AkkSg,
    AkkPl,
}

static FIELDS: LazyLock<Vec<(Slot, Regex)>> = LazyLock::new(|| {
    [
        (Slot::NomSg, "Nominativ Singular"),
        (Slot::NomPl, "Nominativ Plural"),
        (Slot::GenSg, "Genitiv Singular"),
        (Slot::GenPl, "Genitiv Plural"),
        (Slot::DatSg, "Dativ Singular"),
        (Slot::DatPl, "Dativ Plural"),
        (Slot::AkkSg, "Akkusativ Singular"),
        (Slot::AkkPl, "Akkusativ Plural"),
    ]
    .into_iter()
    .map(|(slot, label)| {
        let pattern = format!(r"(?i)\|{}(?: 1)?[ \t]*=[ \t]*([^|\n]+)", label);
        (slot, Regex::new(&pattern).unwrap())
    })
    .collect()
});

/// Read the eight case/number cells of the noun overview table.
pub fn extract(text: &str) -> Declension {
    let mut decl = Declension::default();

    for (slot, re) in FIELDS.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let value = clean_value(&caps[1]);
        let target = match slot {
            Slot::NomSg => &mut decl.nominative_singular,
            Slot::NomPl => &mut decl.nominative_plural,
            Slot::GenSg => &mut decl.genitive_singular,
            Slot::GenPl => &mut decl.genitive_plural,
            Slot::DatSg => &mut decl.dative_singular,
            Slot::DatPl => &mut decl.dative_plural,
            Slot::AkkSg => &mut decl.accusative_singular,
            Slot::AkkPl => &mut decl.accusative_plural,
        };
        *target = value;
    }

    decl
}

fn clean_value(raw: &str) -> Option<String> {
    let value = display_text(raw);
    match value.as_str() {
        "" | "-" | "—" | "–" => None,
        _ => Some(value),
    }
}
