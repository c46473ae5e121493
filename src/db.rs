use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::{FromSql, Value};
use rusqlite::{params, Connection, Transaction};

use crate::record::{Article, Category, NounRecord};

pub const DEFAULT_DB_PATH: &str = "data/words.db";
pub const LEGACY_TABLE: &str = "derdiedas";

/// Open (or create) the store and make sure the schema exists.
pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS words (
            id             INTEGER PRIMARY KEY,
            word           TEXT UNIQUE NOT NULL,
            article        TEXT NOT NULL CHECK(article IN ('der','die','das')),
            plural_article TEXT NOT NULL DEFAULT 'die',
            plural         TEXT,
            gen_singular   TEXT,
            dat_singular   TEXT,
            akk_singular   TEXT,
            gen_plural     TEXT,
            dat_plural     TEXT,
            akk_plural     TEXT,
            syllables      TEXT,
            syllable_count INTEGER NOT NULL DEFAULT 1 CHECK(syllable_count >= 1),
            category       TEXT,
            is_compound    BOOLEAN NOT NULL DEFAULT 0,
            compound_parts TEXT,
            difficulty     INTEGER NOT NULL DEFAULT 1 CHECK(difficulty BETWEEN 1 AND 5),
            frequency_rank INTEGER,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_words_category ON words(category);
        CREATE INDEX IF NOT EXISTS idx_words_difficulty ON words(difficulty);

        CREATE TABLE IF NOT EXISTS example_sentences (
            id        INTEGER PRIMARY KEY,
            word_id   INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            position  INTEGER NOT NULL,
            sentence  TEXT NOT NULL,
            UNIQUE(word_id, position)
        );
        CREATE INDEX IF NOT EXISTS idx_sentences_word ON example_sentences(word_id);

        -- Two-column relation read by older clients
        CREATE TABLE IF NOT EXISTS derdiedas (
            nominativ_singular TEXT PRIMARY KEY,
            genus              TEXT NOT NULL CHECK(genus IN ('m','f','n'))
        );
        ",
    )?;
    Ok(())
}

// ── Writes ──

/// Upsert a batch of records in one transaction. Rolled back on drop if any
/// row fails, so no record of the batch is half-written.
pub fn save_nouns(conn: &Connection, records: &[NounRecord]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for record in records {
        upsert_noun(&tx, record).with_context(|| format!("saving {:?}", record.word))?;
    }
    tx.commit()?;
    Ok(records.len())
}

/// Insert or replace one record, its sentences, and its legacy row inside
/// the caller's transaction.
pub fn upsert_noun(tx: &Transaction, r: &NounRecord) -> Result<i64> {
    let parts = r.compound_parts.as_ref().map(serde_json::to_string).transpose()?;
    let category = r.category.map(Category::label);

    let id: i64 = {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO words
             (word, article, plural_article, plural, gen_singular, dat_singular, akk_singular,
              gen_plural, dat_plural, akk_plural, syllables, syllable_count, category,
              is_compound, compound_parts, difficulty, frequency_rank)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)
             ON CONFLICT(word) DO UPDATE SET
                article = excluded.article,
                plural_article = excluded.plural_article,
                plural = excluded.plural,
                gen_singular = excluded.gen_singular,
                dat_singular = excluded.dat_singular,
                akk_singular = excluded.akk_singular,
                gen_plural = excluded.gen_plural,
                dat_plural = excluded.dat_plural,
                akk_plural = excluded.akk_plural,
                syllables = excluded.syllables,
                syllable_count = excluded.syllable_count,
                category = excluded.category,
                is_compound = excluded.is_compound,
                compound_parts = excluded.compound_parts,
                difficulty = excluded.difficulty,
                frequency_rank = excluded.frequency_rank
             RETURNING id",
        )?;
        stmt.query_row(
            params![
                r.word, r.article.as_str(), r.plural_article(), r.plural,
                r.gen_singular, r.dat_singular, r.akk_singular,
                r.gen_plural, r.dat_plural, r.akk_plural,
                r.syllables, r.syllable_count, category,
                r.is_compound, parts, r.difficulty, r.frequency_rank,
            ],
            |row| row.get(0),
        )?
    };

    tx.prepare_cached("DELETE FROM example_sentences WHERE word_id = ?1")?
        .execute([id])?;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO example_sentences (word_id, position, sentence) VALUES (?1, ?2, ?3)",
        )?;
        for (position, sentence) in r.example_sentences.iter().enumerate() {
            stmt.execute(params![id, position as i64, sentence])?;
        }
    }

    tx.prepare_cached(
        "INSERT INTO derdiedas (nominativ_singular, genus) VALUES (?1, ?2)
         ON CONFLICT(nominativ_singular) DO UPDATE SET genus = excluded.genus",
    )?
    .execute(params![r.word, r.article.genus()])?;

    Ok(id)
}

// ── Reads ──

/// Every stored record with its sentences, ordered by word.
pub fn fetch_nouns(conn: &Connection) -> Result<Vec<NounRecord>> {
    let mut sentences: HashMap<i64, Vec<String>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT word_id, sentence FROM example_sentences ORDER BY word_id, position",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (word_id, sentence) = row?;
            sentences.entry(word_id).or_default().push(sentence);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT id, word, article, plural, gen_singular, dat_singular, akk_singular,
                gen_plural, dat_plural, akk_plural, syllables, syllable_count, category,
                is_compound, compound_parts, difficulty, frequency_rank
         FROM words ORDER BY word",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StoredRow {
                id: row.get(0)?,
                word: row.get(1)?,
                article: row.get(2)?,
                plural: row.get(3)?,
                gen_singular: row.get(4)?,
                dat_singular: row.get(5)?,
                akk_singular: row.get(6)?,
                gen_plural: row.get(7)?,
                dat_plural: row.get(8)?,
                akk_plural: row.get(9)?,
                syllables: row.get(10)?,
                syllable_count: row.get(11)?,
                category: row.get(12)?,
                is_compound: row.get(13)?,
                compound_parts: row.get(14)?,
                difficulty: row.get(15)?,
                frequency_rank: row.get(16)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|row| {
            let example_sentences = sentences.remove(&row.id).unwrap_or_default();
            row.into_record(example_sentences)
        })
        .collect()
}

struct StoredRow {
    id: i64,
    word: String,
    article: String,
    plural: Option<String>,
    gen_singular: Option<String>,
    dat_singular: Option<String>,
    akk_singular: Option<String>,
    gen_plural: Option<String>,
    dat_plural: Option<String>,
    akk_plural: Option<String>,
    syllables: Option<String>,
    syllable_count: u32,
    category: Option<String>,
    is_compound: bool,
    compound_parts: Option<String>,
    difficulty: u8,
    frequency_rank: Option<u32>,
}

impl StoredRow {
    fn into_record(self, example_sentences: Vec<String>) -> Result<NounRecord> {
        let article = Article::parse(&self.article)
            .with_context(|| format!("bad article {:?} for {:?}", self.article, self.word))?;
        let compound_parts = self
            .compound_parts
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()
            .with_context(|| format!("bad compound_parts for {:?}", self.word))?;

        Ok(NounRecord {
            word: self.word,
            article,
            plural: self.plural,
            gen_singular: self.gen_singular,
            dat_singular: self.dat_singular,
            akk_singular: self.akk_singular,
            gen_plural: self.gen_plural,
            dat_plural: self.dat_plural,
            akk_plural: self.akk_plural,
            syllables: self.syllables,
            syllable_count: self.syllable_count,
            // Unknown labels (hand-edited rows) read back as uncategorized.
            category: self.category.as_deref().and_then(Category::from_label),
            is_compound: self.is_compound,
            compound_parts,
            difficulty: self.difficulty,
            frequency_rank: self.frequency_rank,
            example_sentences,
        })
    }
}

// ── Enrichment ──

/// Create `words` rows for legacy entries that have none. Returns how many.
pub fn promote_legacy_rows(conn: &Connection) -> Result<usize> {
    let n = conn.execute(
        "INSERT INTO words (word, article)
         SELECT d.nominativ_singular,
                CASE d.genus WHEN 'm' THEN 'der' WHEN 'f' THEN 'die' ELSE 'das' END
         FROM derdiedas d
         LEFT JOIN words w ON w.word = d.nominativ_singular
         WHERE w.id IS NULL",
        [],
    )?;
    Ok(n)
}

/// Rows that never went through extraction (no frequency rank yet).
pub fn fetch_unenriched(conn: &Connection) -> Result<Vec<(i64, String)>> {
    let mut stmt =
        conn.prepare("SELECT id, word FROM words WHERE frequency_rank IS NULL ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct EnrichRow {
    pub id: i64,
    pub syllable_count: u32,
    pub category: Option<Category>,
    pub is_compound: bool,
    pub compound_parts: Option<Vec<String>>,
    pub difficulty: u8,
    pub frequency_rank: u32,
}

/// Fill derived fields. Existing category and compound parts are kept.
pub fn save_enrichment(conn: &Connection, rows: &[EnrichRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "UPDATE words SET
                syllable_count = ?2,
                category = COALESCE(category, ?3),
                is_compound = ?4,
                compound_parts = COALESCE(compound_parts, ?5),
                difficulty = ?6,
                frequency_rank = COALESCE(frequency_rank, ?7)
             WHERE id = ?1",
        )?;
        for r in rows {
            let parts = r.compound_parts.as_ref().map(serde_json::to_string).transpose()?;
            stmt.execute(params![
                r.id,
                r.syllable_count,
                r.category.map(Category::label),
                r.is_compound,
                parts,
                r.difficulty,
                r.frequency_rank,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Legacy relation ──

/// The `CREATE TABLE` statement of the legacy relation.
pub fn legacy_schema(conn: &Connection) -> Result<String> {
    let sql: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [LEGACY_TABLE],
            |r| r.get(0),
        )
        .context("legacy table missing")?;
    Ok(sql)
}

pub fn legacy_columns(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({LEGACY_TABLE})"))?;
    let cols = stmt
        .query_map([], |row| row.get(1))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(cols)
}

pub fn count_legacy(conn: &Connection) -> Result<usize> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {LEGACY_TABLE}"), [], |r| r.get(0))?;
    Ok(n)
}

/// One page of legacy rows in key order, as raw SQLite values.
pub fn fetch_legacy_batch(conn: &Connection, offset: usize, limit: usize) -> Result<Vec<Vec<Value>>> {
    let ncols = legacy_columns(conn)?.len();
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {LEGACY_TABLE} ORDER BY nominativ_singular LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt
        .query_map(params![limit as i64, offset as i64], |row| {
            (0..ncols).map(|i| row.get::<_, Value>(i)).collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Report ──

pub struct Report {
    pub total: usize,
    pub by_article: Vec<(String, usize)>,
    pub top_categories: Vec<(String, usize)>,
    pub with_plural: usize,
    pub with_syllables: usize,
    pub compounds: usize,
    pub sentences: usize,
    pub by_difficulty: Vec<(u8, usize)>,
    pub legacy_rows: usize,
    /// Words that slipped past the filter (should be zero).
    pub flagged: usize,
}

const TOP_CATEGORIES: usize = 15;

pub fn get_report(conn: &Connection) -> Result<Report> {
    let count = |sql: &str| -> Result<usize> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };

    let total = count("SELECT COUNT(*) FROM words")?;
    let with_plural = count("SELECT COUNT(*) FROM words WHERE plural IS NOT NULL")?;
    let with_syllables = count("SELECT COUNT(*) FROM words WHERE syllables IS NOT NULL")?;
    let compounds = count("SELECT COUNT(*) FROM words WHERE is_compound = 1")?;
    let sentences = count("SELECT COUNT(*) FROM example_sentences")?;
    let flagged = count(
        "SELECT COUNT(*) FROM words WHERE lower(word) LIKE '%sex%' OR lower(word) LIKE '%porno%'",
    )?;

    let by_article = grouped(
        conn,
        "SELECT article, COUNT(*) FROM words GROUP BY article ORDER BY COUNT(*) DESC, article",
    )?;
    let top_categories = grouped(
        conn,
        &format!(
            "SELECT category, COUNT(*) FROM words WHERE category IS NOT NULL
             GROUP BY category ORDER BY COUNT(*) DESC, category LIMIT {TOP_CATEGORIES}"
        ),
    )?;
    let by_difficulty = grouped(
        conn,
        "SELECT difficulty, COUNT(*) FROM words GROUP BY difficulty ORDER BY difficulty",
    )?;

    Ok(Report {
        total,
        by_article,
        top_categories,
        with_plural,
        with_syllables,
        compounds,
        sentences,
        by_difficulty,
        legacy_rows: count_legacy(conn)?,
        flagged,
    })
}

fn grouped<K: FromSql>(conn: &Connection, sql: &str) -> Result<Vec<(K, usize)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Tests ──
