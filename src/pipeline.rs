use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db;
use crate::dump::PageSource;
use crate::parser::{self, Outcome};
use crate::record::NounRecord;

const BATCH_SIZE: usize = 500;
const LOG_EVERY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after this many accepted nouns.
    pub limit: Option<usize>,
    /// Only accept pages with a German noun section.
    pub nouns_only: bool,
    pub progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { limit: None, nouns_only: true, progress: false }
    }
}

/// Counters for one parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Every `<page>` closed by the reader, including dropped ones.
    pub pages_seen: usize,
    /// Pages the reader discarded for lacking a title or body.
    pub dropped: usize,
    pub accepted: usize,
    pub with_plural: usize,
    pub with_declension: usize,
    pub with_examples: usize,
    pub skipped: usize,
    pub no_article: usize,
    pub not_noun: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Accepted(r) => {
                self.accepted += 1;
                if r.plural.is_some() {
                    self.with_plural += 1;
                }
                if r.has_declension() {
                    self.with_declension += 1;
                }
                if !r.example_sentences.is_empty() {
                    self.with_examples += 1;
                }
            }
            Outcome::Inappropriate => self.skipped += 1,
            Outcome::NoArticle => self.no_article += 1,
            Outcome::NotNoun => self.not_noun += 1,
        }
    }

    pub fn print(&self) {
        println!("Pages seen:        {}", self.pages_seen);
        if self.dropped > 0 {
            println!("  incomplete:      {}", self.dropped);
        }
        println!("Nouns accepted:    {}", self.accepted);
        println!("  with plural:     {}", self.with_plural);
        println!("  with declension: {}", self.with_declension);
        println!("  with examples:   {}", self.with_examples);
        println!("Skipped (filter):  {}", self.skipped);
        println!("No article:        {}", self.no_article);
        if self.not_noun > 0 {
            println!("Not a noun:        {}", self.not_noun);
        }
    }
}

/// Pull pages until input runs out or the accepted cap is hit, saving
/// records in batches. The pending batch is flushed before an input error
/// is returned.
pub fn run<S: PageSource>(mut pages: S, conn: &Connection, opts: RunOptions) -> Result<RunStats> {
    let pb = if opts.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} pages ({per_sec}) {msg}")?,
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut stats = RunStats::default();
    let mut batch: Vec<NounRecord> = Vec::with_capacity(BATCH_SIZE);

    if opts.limit == Some(0) {
        return Ok(stats);
    }

    let mut yielded = 0;
    while let Some(page) = pages.next() {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                flush(conn, &mut batch)?;
                pb.abandon();
                return Err(e).context(format!("reading dump after {} pages", yielded + pages.dropped()));
            }
        };

        yielded += 1;
        stats.dropped = pages.dropped();
        stats.pages_seen = yielded + stats.dropped;
        pb.set_position(stats.pages_seen as u64);
        if stats.pages_seen % LOG_EVERY == 0 {
            debug!("{} pages, {} nouns", stats.pages_seen, stats.accepted);
            pb.set_message(format!("{} nouns", stats.accepted));
        }

        let outcome = parser::process_page(&page, opts.nouns_only);
        stats.record(&outcome);
        if let Outcome::Accepted(record) = outcome {
            batch.push(*record);
            if batch.len() >= BATCH_SIZE {
                flush(conn, &mut batch)?;
            }
        }

        if opts.limit.is_some_and(|n| stats.accepted >= n) {
            info!("Reached limit of {} nouns", stats.accepted);
            break;
        }
    }

    stats.dropped = pages.dropped();
    stats.pages_seen = yielded + stats.dropped;
    flush(conn, &mut batch)?;
    pb.finish_and_clear();
    info!(
        "Parsed {} pages, saved {} nouns ({} skipped, {} without article)",
        stats.pages_seen, stats.accepted, stats.skipped, stats.no_article
    );
    Ok(stats)
}

fn flush(conn: &Connection, batch: &mut Vec<NounRecord>) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }
    let n = db::save_nouns(conn, batch)?;
    debug!("Committed batch of {}", n);
    batch.clear();
    Ok(())
}

// ── Tests ──
