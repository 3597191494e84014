use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const PLAYER_TAG_VAR: &str = "CR_PLAYER_TAG";
pub const BEARER_TOKEN_VAR: &str = "CR_BEARER_TOKEN";

const PLAYER_TAG_PLACEHOLDER: &str = "YOUR_PLAYER_TAG_HERE";
const BEARER_TOKEN_PLACEHOLDER: &str = "YOUR_BEARER_TOKEN_HERE";

const DEFAULT_API_BASE: &str = "https://api.clashroyale.com/v1";
const DEFAULT_GAME_MODE: &str = "Ladder";
const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
const DEFAULT_SHEET_NAME: &str = "Clash Royale History";
const DEFAULT_WORKSHEET_NAME: &str = "Sheet1";
const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const CACHE_DIR: &str = "ladder_sheet";
const SQLITE_FILE: &str = "battles.sqlite";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{0} is still set to its placeholder value")]
    Placeholder(&'static str),
    #[error("unknown sink backend {0:?} (expected \"sheets\" or \"sqlite\")")]
    UnknownBackend(String),
    #[error("no sqlite path configured and no cache directory found")]
    NoSqlitePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkBackend {
    Sheets,
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub credentials_file: PathBuf,
    pub spreadsheet_name: String,
    pub spreadsheet_id: Option<String>,
    pub worksheet_name: String,
    pub api_base: String,
    pub drive_files_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub player_tag: String,
    pub bearer_token: String,
    pub api_base: String,
    pub game_mode: String,
    pub backend: SinkBackend,
    pub sheets: SheetsConfig,
    pub sqlite_path: Option<PathBuf>,
    pub fail_on_fetch_error: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let player_tag = required(&lookup, PLAYER_TAG_VAR, PLAYER_TAG_PLACEHOLDER)?;
        let bearer_token = required(&lookup, BEARER_TOKEN_VAR, BEARER_TOKEN_PLACEHOLDER)?;

        let backend = match optional(&lookup, "SINK_BACKEND")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("sheets") | Some("gsheets") => SinkBackend::Sheets,
            Some("sqlite") => SinkBackend::Sqlite,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let sheets = SheetsConfig {
            credentials_file: optional(&lookup, "GSHEET_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE)),
            spreadsheet_name: optional(&lookup, "GSHEET_NAME")
                .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            spreadsheet_id: optional(&lookup, "GSHEET_ID"),
            worksheet_name: optional(&lookup, "GSHEET_WORKSHEET")
                .unwrap_or_else(|| DEFAULT_WORKSHEET_NAME.to_string()),
            api_base: optional(&lookup, "GSHEET_API_BASE")
                .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string()),
            drive_files_url: optional(&lookup, "GDRIVE_FILES_URL")
                .unwrap_or_else(|| DEFAULT_DRIVE_FILES_URL.to_string()),
        };

        let sqlite_path = optional(&lookup, "SINK_SQLITE_PATH")
            .map(PathBuf::from)
            .or_else(|| default_sqlite_path(&lookup));

        Ok(Self {
            player_tag,
            bearer_token,
            api_base: optional(&lookup, "CR_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            game_mode: optional(&lookup, "CR_GAME_MODE")
                .unwrap_or_else(|| DEFAULT_GAME_MODE.to_string()),
            backend,
            sheets,
            sqlite_path,
            fail_on_fetch_error: parse_bool(optional(&lookup, "FETCH_FAIL_EXIT"), false),
        })
    }

    pub fn sqlite_path(&self) -> Result<&PathBuf, ConfigError> {
        self.sqlite_path.as_ref().ok_or(ConfigError::NoSqlitePath)
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    placeholder: &str,
) -> Result<String, ConfigError> {
    let value = optional(lookup, key).ok_or(ConfigError::Missing(key))?;
    if value == placeholder {
        return Err(ConfigError::Placeholder(key));
    }
    Ok(value)
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_bool(raw: Option<String>, default: bool) -> bool {
    raw.map(|v| {
        let t = v.to_ascii_lowercase();
        !(t == "0" || t == "false" || t == "off" || t == "no")
    })
    .unwrap_or(default)
}

fn default_sqlite_path(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    // Prefer XDG cache, then ~/.cache.
    if let Some(base) = optional(lookup, "XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(CACHE_DIR).join(SQLITE_FILE));
    }
    let home = optional(lookup, "HOME")?;
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(SQLITE_FILE),
    )
}
