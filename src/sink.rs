use std::collections::HashSet;

use anyhow::Result;

use crate::battlelog::BattleRecord;
use crate::row_store::{RowStore, header_row};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub connected: bool,
    pub header_written: bool,
    pub existing_keys: usize,
    pub appended: usize,
}

/// Appends the records whose `battle_time` is not yet in the store's first
/// column, in input order. `open` is only called when there is something to
/// save; every store error propagates.
pub fn save_new_battles<S, F>(records: &[BattleRecord], open: F) -> Result<SaveSummary>
where
    S: RowStore,
    F: FnOnce() -> Result<S>,
{
    if records.is_empty() {
        log::info!("no new data to save");
        return Ok(SaveSummary::default());
    }

    log::info!("connecting to sheet");
    let mut store = open()?;
    let mut summary = SaveSummary {
        connected: true,
        ..SaveSummary::default()
    };

    if store.first_cell()?.is_none() {
        store.append_rows(&[header_row()])?;
        summary.header_written = true;
        log::info!("wrote header row");
    }

    let mut seen: HashSet<String> = store.column_values(0)?.into_iter().collect();
    summary.existing_keys = seen.len();

    let new_rows: Vec<_> = records
        .iter()
        .filter(|record| seen.insert(record.battle_time.clone()))
        .map(BattleRecord::to_row)
        .collect();

    if new_rows.is_empty() {
        log::info!("no unique new battles to add");
        return Ok(summary);
    }

    store.append_rows(&new_rows)?;
    summary.appended = new_rows.len();
    log::info!("appended {} new rows", new_rows.len());
    Ok(summary)
}
