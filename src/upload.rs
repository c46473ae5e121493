use std::fmt::Write as _;
use std::process::Command;

use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{self, LEGACY_TABLE};

/// Somewhere SQL statements can be executed one at a time.
pub trait RemoteSql {
    fn execute(&mut self, sql: &str) -> Result<()>;
}

/// Runs statements through `spin cloud sqlite execute`.
pub struct SpinCloud {
    pub app: String,
    pub label: String,
}

impl RemoteSql for SpinCloud {
    fn execute(&mut self, sql: &str) -> Result<()> {
        let output = Command::new("spin")
            .args(["cloud", "sqlite", "execute", "--app", &self.app, "--label", &self.label, sql])
            .output()
            .context("failed to run `spin`; is it installed and on PATH?")?;

        if !output.status.success() {
            bail!(
                "spin exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct UploadStats {
    pub rows: usize,
    pub batches: usize,
}

/// Recreate the legacy table remotely and replay its rows in batches.
/// Stops at the first failing statement.
pub fn upload(conn: &Connection, remote: &mut dyn RemoteSql, batch_size: usize) -> Result<UploadStats> {
    if batch_size == 0 {
        bail!("batch size must be at least 1");
    }

    let schema = db::legacy_schema(conn)?;
    let columns = db::legacy_columns(conn)?;
    let total = db::count_legacy(conn)?;
    let batches = total.div_ceil(batch_size);

    info!("Creating table {}", LEGACY_TABLE);
    remote.execute(&schema).context("creating remote table")?;

    info!("Uploading {} rows in {} batches of {}", total, batches, batch_size);
    let mut rows = 0;
    for i in 0..batches {
        let batch = db::fetch_legacy_batch(conn, i * batch_size, batch_size)?;
        if batch.is_empty() {
            break;
        }
        let sql = render_insert(LEGACY_TABLE, &columns, &batch);
        remote
            .execute(&sql)
            .with_context(|| format!("failed at batch {}/{}", i + 1, batches))?;
        rows += batch.len();
        debug!("Uploaded batch {}/{}", i + 1, batches);
    }

    info!("Upload complete: {} rows", rows);
    Ok(UploadStats { rows, batches })
}

/// One multi-row `INSERT` with every value rendered as a SQL literal.
pub fn render_insert(table: &str, columns: &[String], rows: &[Vec<Value>]) -> String {
    let mut sql = format!("INSERT INTO {table} ({}) VALUES ", columns.join(","));
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            sql.push(',');
        }
        sql.push('(');
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                sql.push(',');
            }
            push_literal(&mut sql, value);
        }
        sql.push(')');
    }
    sql
}

fn push_literal(sql: &mut String, value: &Value) {
    match value {
        Value::Null => sql.push_str("NULL"),
        Value::Integer(n) => {
            let _ = write!(sql, "{n}");
        }
        Value::Real(f) => {
            let _ = write!(sql, "{f}");
        }
        Value::Text(s) => {
            sql.push('\'');
            sql.push_str(&s.replace('\'', "''"));
            sql.push('\'');
        }
        Value::Blob(bytes) => {
            sql.push_str("X'");
            for b in bytes {
                let _ = write!(sql, "{b:02X}");
            }
            sql.push('\'');
        }
    }
}

// ── Tests ──
