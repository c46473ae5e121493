mod db;
mod dump;
mod enrich;
mod parser;
mod pipeline;
mod record;
mod upload;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "wikinoun", about = "German noun database from a Wiktionary dump")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a pages-articles dump (.xml or .xml.bz2) into the database
    Parse {
        /// Path to the dump
        source: PathBuf,
        /// Database file
        #[arg(short = 'o', long, default_value = db::DEFAULT_DB_PATH)]
        db: PathBuf,
        /// Stop after this many accepted nouns
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Also accept pages without a German noun section
        #[arg(long)]
        all_sections: bool,
    },
    /// Fill derived fields for words that were never parsed (e.g. legacy rows)
    Enrich {
        #[arg(short = 'o', long, default_value = db::DEFAULT_DB_PATH)]
        db: PathBuf,
    },
    /// Print database statistics
    Report {
        #[arg(short = 'o', long, default_value = db::DEFAULT_DB_PATH)]
        db: PathBuf,
    },
    /// Write every record as a JSON array
    Export {
        /// Output file
        out: PathBuf,
        #[arg(short = 'o', long, default_value = db::DEFAULT_DB_PATH)]
        db: PathBuf,
    },
    /// Replay the legacy der/die/das table to a Spin cloud database
    Upload {
        #[arg(short = 'o', long, default_value = db::DEFAULT_DB_PATH)]
        db: PathBuf,
        #[arg(long, default_value = "der-die-das")]
        app: String,
        #[arg(long, default_value = "default")]
        label: String,
        #[arg(long, default_value = "100")]
        batch_size: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { source, db, limit, all_sections } => {
            let conn = db::connect(&db)?;
            let pages = dump::open(&source)
                .with_context(|| format!("opening dump {}", source.display()))?;
            info!("Parsing {} into {}", source.display(), db.display());

            let opts = pipeline::RunOptions { limit, nouns_only: !all_sections, progress: true };
            let stats = pipeline::run(pages, &conn, opts)?;
            stats.print();
            Ok(())
        }
        Commands::Enrich { db } => {
            let conn = db::connect(&db)?;
            let s = enrich::enrich(&conn)?;
            if s.enriched == 0 {
                println!("Nothing to enrich.");
                return Ok(());
            }
            println!("Promoted:    {}", s.promoted);
            println!("Enriched:    {}", s.enriched);
            println!("Categorized: {} ({}%)", s.categorized, percent(s.categorized, s.enriched));
            println!("Compounds:   {} ({}%)", s.compounds, percent(s.compounds, s.enriched));
            Ok(())
        }
        Commands::Report { db } => {
            let conn = db::connect(&db)?;
            print_report(&db::get_report(&conn)?);
            Ok(())
        }
        Commands::Export { out, db } => {
            let conn = db::connect(&db)?;
            let nouns = db::fetch_nouns(&conn)?;
            let file = File::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &nouns)?;
            writer.flush()?;
            println!("Exported {} nouns to {}", nouns.len(), out.display());
            Ok(())
        }
        Commands::Upload { db, app, label, batch_size } => {
            let conn = db::connect(&db)?;
            let mut remote = upload::SpinCloud { app, label };
            let s = upload::upload(&conn, &mut remote, batch_size)?;
            println!("Uploaded {} rows in {} batches.", s.rows, s.batches);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_report(r: &db::Report) {
    println!("Report generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Total nouns:    {}", r.total);
    if r.total == 0 {
        println!("Database is empty. Run 'parse' first.");
        return;
    }

    println!("\n--- Articles ---");
    for (article, n) in &r.by_article {
        println!("  {:<4} {:>8} ({}%)", article, n, percent(*n, r.total));
    }

    if !r.top_categories.is_empty() {
        println!("\n--- Categories ---");
        for (category, n) in &r.top_categories {
            println!("  {:<10} {:>8}", category, n);
        }
    }

    println!("\n--- Coverage ---");
    println!("  Plural:     {:>8} ({}%)", r.with_plural, percent(r.with_plural, r.total));
    println!("  Syllables:  {:>8} ({}%)", r.with_syllables, percent(r.with_syllables, r.total));
    println!("  Compounds:  {:>8} ({}%)", r.compounds, percent(r.compounds, r.total));
    println!("  Sentences:  {:>8}", r.sentences);

    println!("\n--- Difficulty ---");
    for (level, n) in &r.by_difficulty {
        println!("  {} {:>8}", level, n);
    }

    println!("\nLegacy rows:    {}", r.legacy_rows);
    if r.flagged > 0 {
        warn!("{} stored words match the denylist", r.flagged);
    }
}

fn percent(part: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        part * 100 / total
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
