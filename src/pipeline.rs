use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::battlelog::BattleRecord;
use crate::battlelog_fetch::{FetchError, fetch_battles};
use crate::config::{Config, SinkBackend};
use crate::sheets::GoogleSheet;
use crate::sink::{SaveSummary, save_new_battles};
use crate::sqlite_store::SqliteSheet;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// `--db`: write to the local sqlite sheet at this path.
    pub db_path: Option<PathBuf>,
}

impl RunOptions {
    /// Parses `--dry-run`, `--db <path>` and `--db=<path>`; other arguments
    /// are ignored.
    pub fn from_args(args: &[String]) -> Self {
        let mut opts = Self::default();
        for (idx, arg) in args.iter().enumerate() {
            if arg == "--dry-run" {
                opts.dry_run = true;
            }
            if let Some(path) = arg.strip_prefix("--db=") {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    opts.db_path = Some(PathBuf::from(trimmed));
                }
            }
            if arg == "--db"
                && let Some(next) = args.get(idx + 1)
                && !next.trim().is_empty()
            {
                opts.db_path = Some(PathBuf::from(next));
            }
        }
        opts
    }

    /// `cfg` with the command-line overrides applied.
    pub fn apply(&self, cfg: &Config) -> Config {
        let mut cfg = cfg.clone();
        if let Some(path) = &self.db_path {
            cfg.sqlite_path = Some(path.clone());
            cfg.backend = SinkBackend::Sqlite;
        }
        cfg
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub fetched: usize,
    pub fetch_error: Option<FetchError>,
    pub saved: SaveSummary,
}

/// Fetch, then append. A fetch failure is logged and recorded, and the sink
/// stage is skipped; sink failures are returned.
pub fn run_once(cfg: &Config, opts: &RunOptions) -> Result<RunSummary> {
    let cfg = &opts.apply(cfg);
    let mut summary = RunSummary::default();

    let records = match fetch_battles(cfg) {
        Ok(records) => records,
        Err(err) => {
            log::error!("error fetching data: {err}");
            summary.fetch_error = Some(err);
            return Ok(summary);
        }
    };
    summary.fetched = records.len();

    if opts.dry_run {
        for record in &records {
            log::info!(
                "{} {} {:+} -> {}",
                record.battle_time,
                record.result,
                record.trophy_change,
                record.current_trophies
            );
        }
        log::info!("dry run: sheet left untouched");
        return Ok(summary);
    }

    summary.saved = save_to_backend(cfg, &records)?;
    Ok(summary)
}

pub fn save_to_backend(cfg: &Config, records: &[BattleRecord]) -> Result<SaveSummary> {
    match cfg.backend {
        SinkBackend::Sheets => save_new_battles(records, || GoogleSheet::open(&cfg.sheets)),
        SinkBackend::Sqlite => save_new_battles(records, || {
            let path = cfg.sqlite_path()?;
            SqliteSheet::open(path, &cfg.sheets.worksheet_name)
                .with_context(|| format!("open sqlite sheet {}", path.display()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_in_both_db_forms() {
        let opts = RunOptions::from_args(&args(&["--dry-run", "--db", "/tmp/a.sqlite"]));
        assert!(opts.dry_run);
        assert_eq!(opts.db_path, Some(PathBuf::from("/tmp/a.sqlite")));

        let opts = RunOptions::from_args(&args(&["--db=/tmp/b.sqlite"]));
        assert!(!opts.dry_run);
        assert_eq!(opts.db_path, Some(PathBuf::from("/tmp/b.sqlite")));
    }

    #[test]
    fn blank_or_dangling_db_is_ignored() {
        assert!(RunOptions::from_args(&args(&["--db"])).db_path.is_none());
        assert!(RunOptions::from_args(&args(&["--db="])).db_path.is_none());
        assert!(RunOptions::from_args(&args(&["--db", " "])).db_path.is_none());
    }
}
