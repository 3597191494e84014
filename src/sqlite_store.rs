use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::row_store::{CellValue, RowStore};

/// Local stand-in for a spreadsheet: ordered rows per worksheet in SQLite.
pub struct SqliteSheet {
    conn: Connection,
    worksheet: String,
}

impl SqliteSheet {
    pub fn open(path: &Path, worksheet: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        Self::from_connection(conn, worksheet)
    }

    pub fn open_in_memory(worksheet: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::from_connection(conn, worksheet)
    }

    fn from_connection(conn: Connection, worksheet: &str) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn,
            worksheet: worksheet.to_string(),
        })
    }

    pub fn row_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sheet_rows WHERE worksheet = ?1",
                params![self.worksheet],
                |row| row.get(0),
            )
            .context("count sheet rows")?;
        Ok(count as usize)
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> Result<Vec<Vec<CellValue>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cells FROM sheet_rows WHERE worksheet = ?1 ORDER BY row_id")
            .context("prepare row select")?;
        let raw = stmt
            .query_map(params![self.worksheet], |row| row.get::<_, String>(0))
            .context("query sheet rows")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read sheet rows")?;
        raw.iter()
            .map(|cells| serde_json::from_str(cells).context("invalid stored row"))
            .collect()
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sheet_rows (
            row_id INTEGER PRIMARY KEY AUTOINCREMENT,
            worksheet TEXT NOT NULL,
            cells TEXT NOT NULL,
            appended_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sheet_rows_worksheet ON sheet_rows(worksheet, row_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl RowStore for SqliteSheet {
    fn first_cell(&mut self) -> Result<Option<String>> {
        let rows = self.rows()?;
        Ok(rows
            .first()
            .and_then(|row| row.first())
            .map(|cell| cell.to_string())
            .filter(|s| !s.is_empty()))
    }

    fn column_values(&mut self, col: usize) -> Result<Vec<String>> {
        Ok(self
            .rows()?
            .iter()
            .map(|row| row.get(col).map(|c| c.to_string()).unwrap_or_default())
            .collect())
    }

    fn append_rows(&mut self, rows: &[Vec<CellValue>]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().context("begin append")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO sheet_rows (worksheet, cells, appended_at) VALUES (?1, ?2, ?3)",
                )
                .context("prepare append")?;
            for row in rows {
                let cells = serde_json::to_string(row).context("serialize row")?;
                stmt.execute(params![self.worksheet, cells, now])
                    .context("append row")?;
            }
        }
        tx.commit().context("commit append")?;
        Ok(())
    }
}
