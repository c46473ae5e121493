use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::db::{self, EnrichRow};
use crate::parser::extract::{category, compound, syllables};
use crate::parser::score;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Legacy rows that got a `words` row.
    pub promoted: usize,
    pub enriched: usize,
    pub categorized: usize,
    pub compounds: usize,
}

/// Derive the title-only fields for stored words that never went through
/// extraction. Values already present are left alone.
pub fn enrich(conn: &Connection) -> Result<EnrichStats> {
    let mut stats = EnrichStats {
        promoted: db::promote_legacy_rows(conn)?,
        ..Default::default()
    };
    if stats.promoted > 0 {
        info!("Promoted {} legacy rows", stats.promoted);
    }

    let words = db::fetch_unenriched(conn)?;
    let rows: Vec<EnrichRow> = words
        .into_iter()
        .map(|(id, word)| {
            let syllable_count = syllables::count_syllables(&word);
            let c = compound::detect(&word);
            EnrichRow {
                id,
                syllable_count,
                category: category::classify(&word, None),
                is_compound: c.is_compound,
                compound_parts: c.parts,
                difficulty: score::difficulty(&word, syllable_count),
                frequency_rank: score::frequency_rank(&word),
            }
        })
        .collect();

    stats.enriched = rows.len();
    stats.categorized = rows.iter().filter(|r| r.category.is_some()).count();
    stats.compounds = rows.iter().filter(|r| r.is_compound).count();

    db::save_enrichment(conn, &rows)?;
    info!(
        "Enriched {} words ({} categorized, {} compounds)",
        stats.enriched, stats.categorized, stats.compounds
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Article, Category, NounRecord};

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn promotes_and_fills_legacy_words() {
        let conn = memory_db();
        conn.execute_batch(
            "INSERT INTO derdiedas VALUES ('Hund', 'm');
             INSERT INTO derdiedas VALUES ('Kopfschmerztablette', 'f');",
        )
        .unwrap();

        let stats = enrich(&conn).unwrap();
        assert_eq!(
            stats,
            EnrichStats { promoted: 2, enriched: 2, categorized: 1, compounds: 1 }
        );

        let nouns = db::fetch_nouns(&conn).unwrap();
        let hund = &nouns[0];
        assert_eq!(hund.word, "Hund");
        assert_eq!(hund.article, Article::Der);
        assert_eq!(hund.category, Some(Category::Tier));
        assert_eq!(hund.frequency_rank, Some(400));

        let tablette = &nouns[1];
        assert!(tablette.is_compound);
        assert_eq!(tablette.compound_parts, None);
        assert!(tablette.difficulty >= 4);
    }

    #[test]
    fn parsed_rows_untouched_and_rerun_is_noop() {
        let conn = memory_db();
        let mut baum = NounRecord::new("Baum", Article::Der);
        baum.syllables = Some("Baum".into());
        baum.category = Some(Category::Natur);
        baum.frequency_rank = Some(400);
        db::save_nouns(&conn, std::slice::from_ref(&baum)).unwrap();

        assert_eq!(enrich(&conn).unwrap(), EnrichStats::default());
        assert_eq!(db::fetch_nouns(&conn).unwrap()[0], baum);
    }

    #[test]
    fn existing_category_kept() {
        let conn = memory_db();
        conn.execute(
            "INSERT INTO words (word, article, category) VALUES ('Stuhl', 'der', 'Haus')",
            [],
        )
        .unwrap();
        enrich(&conn).unwrap();
        let stuhl = &db::fetch_nouns(&conn).unwrap()[0];
        assert_eq!(stuhl.category, Some(Category::Haus));
        assert_eq!(stuhl.frequency_rank, Some(500));
    }
}
