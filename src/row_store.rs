use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const HEADER: [&str; 4] = ["battleTime", "result", "trophyChange", "currentTrophies"];

/// A single cell as written to the store. Serializes as a bare JSON string or
/// number so that Sheets keeps numbers numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

pub fn header_row() -> Vec<CellValue> {
    HEADER
        .iter()
        .map(|name| CellValue::Text((*name).to_string()))
        .collect()
}

/// Append-only tabular store: one worksheet of ordered rows.
pub trait RowStore {
    /// Value of the top-left cell, `None` when empty.
    fn first_cell(&mut self) -> Result<Option<String>>;

    /// Every value of column `col` (0-based), top to bottom, as displayed text.
    fn column_values(&mut self, col: usize) -> Result<Vec<String>>;

    /// Appends `rows` after the last existing row, in order, in one call.
    fn append_rows(&mut self, rows: &[Vec<CellValue>]) -> Result<()>;
}

impl<S: RowStore + ?Sized> RowStore for &mut S {
    fn first_cell(&mut self) -> Result<Option<String>> {
        (**self).first_cell()
    }

    fn column_values(&mut self, col: usize) -> Result<Vec<String>> {
        (**self).column_values(col)
    }

    fn append_rows(&mut self, rows: &[Vec<CellValue>]) -> Result<()> {
        (**self).append_rows(rows)
    }
}
