use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::battlelog::{BattleRecord, parse_battlelog_json};
use crate::config::Config;
use crate::http_client::http_client;

/// Why a battle log fetch produced no records. Kept distinct from an empty
/// success so callers can tell "nothing new" from "fetch failed".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid battlelog url: {0}")]
    Url(String),
    #[error("http client unavailable: {0}")]
    Client(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode battlelog: {0}")]
    Decode(String),
}

/// `{api_base}/players/{tag}/battlelog`, the tag escaped as one path segment.
pub fn battlelog_url(api_base: &str, player_tag: &str) -> Result<Url, FetchError> {
    let tag = match player_tag.strip_prefix("%23") {
        Some(rest) => format!("#{rest}"),
        None => player_tag.to_string(),
    };
    let mut url = Url::parse(api_base).map_err(|e| FetchError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::Url(format!("{api_base} cannot hold path segments")))?
        .pop_if_empty()
        .push("players")
        .push(&tag)
        .push("battlelog");
    Ok(url)
}

/// One GET against the battle log endpoint; no retry.
pub fn fetch_battles(cfg: &Config) -> Result<Vec<BattleRecord>, FetchError> {
    let url = battlelog_url(&cfg.api_base, &cfg.player_tag)?;
    log::info!("fetching battle log for {}", cfg.player_tag);

    let client = http_client().map_err(|e| FetchError::Client(format!("{e:#}")))?;
    let resp = client
        .get(url)
        .header(AUTHORIZATION, format!("Bearer {}", cfg.bearer_token))
        .header(ACCEPT, "application/json")
        .send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(FetchError::Status { status, body });
    }

    let records = parse_battlelog_json(&body, &cfg.game_mode)
        .map_err(|e| FetchError::Decode(format!("{e:#}")))?;
    log::info!("found {} {} battles", records.len(), cfg.game_mode);
    Ok(records)
}
