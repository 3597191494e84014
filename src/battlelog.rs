use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::row_store::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleResult {
    Win,
    Loss,
    Draw,
}

impl BattleResult {
    pub fn from_trophy_change(change: i64) -> Self {
        if change > 0 {
            BattleResult::Win
        } else if change < 0 {
            BattleResult::Loss
        } else {
            BattleResult::Draw
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BattleResult::Win => "Win",
            BattleResult::Loss => "Loss",
            BattleResult::Draw => "Draw",
        }
    }
}

impl fmt::Display for BattleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One processed match. `battle_time` is the dedup key in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleRecord {
    pub battle_time: String,
    pub result: BattleResult,
    pub trophy_change: i64,
    pub current_trophies: i64,
}

impl BattleRecord {
    /// Cells in sheet column order: battleTime, result, trophyChange, currentTrophies.
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.battle_time.clone()),
            CellValue::Text(self.result.as_str().to_string()),
            CellValue::Int(self.trophy_change),
            CellValue::Int(self.current_trophies),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBattle {
    #[serde(rename = "battleTime")]
    pub battle_time: Option<String>,
    #[serde(rename = "gameMode")]
    pub game_mode: Option<RawGameMode>,
    #[serde(default)]
    pub team: Vec<RawTeamMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGameMode {
    pub name: Option<String>,
}

/// Absent (or null) trophy fields read as 0.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeamMember {
    #[serde(rename = "trophyChange")]
    pub trophy_change: Option<i64>,
    #[serde(rename = "startingTrophies")]
    pub starting_trophies: Option<i64>,
}

pub fn parse_battlelog_json(raw: &str, game_mode: &str) -> Result<Vec<BattleRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let battles: Vec<RawBattle> =
        serde_json::from_str(trimmed).context("invalid battlelog json")?;
    Ok(process_battles(battles, game_mode))
}

/// Filters to `game_mode`, derives result and trophies, and returns the
/// records oldest first (the API lists newest first).
pub fn process_battles(battles: Vec<RawBattle>, game_mode: &str) -> Vec<BattleRecord> {
    let mut out = Vec::new();
    for battle in battles {
        let mode = battle.game_mode.as_ref().and_then(|m| m.name.as_deref());
        if mode != Some(game_mode) {
            continue;
        }
        let Some(battle_time) = battle.battle_time else {
            log::warn!("skipping {game_mode} battle without battleTime");
            continue;
        };
        let Some(player) = battle.team.first() else {
            log::warn!("skipping battle {battle_time}: empty team list");
            continue;
        };
        let trophy_change = player.trophy_change.unwrap_or(0);
        let Some(current_trophies) = player
            .starting_trophies
            .unwrap_or(0)
            .checked_add(trophy_change)
        else {
            log::warn!("skipping battle {battle_time}: trophy count out of range");
            continue;
        };
        out.push(BattleRecord {
            battle_time,
            result: BattleResult::from_trophy_change(trophy_change),
            trophy_change,
            current_trophies,
        });
    }
    out.reverse();
    out
}
