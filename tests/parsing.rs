use std::fs;
use std::path::PathBuf;

use ladder_sheet::battlelog::{BattleRecord, BattleResult, parse_battlelog_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_battlelog_fixture_oldest_first() {
    let raw = read_fixture("battlelog.json");
    let rows = parse_battlelog_json(&raw, "Ladder").expect("fixture should parse");
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].battle_time, "20251016T185002.000Z");
    assert_eq!(rows[0].result, BattleResult::Draw);
    assert_eq!(rows[0].trophy_change, 0);
    assert_eq!(rows[0].current_trophies, 7441);

    assert_eq!(rows[1].battle_time, "20251016T191540.000Z");
    assert_eq!(rows[1].result, BattleResult::Loss);
    assert_eq!(rows[1].current_trophies, 7412);

    assert_eq!(rows[2].battle_time, "20251016T194512.000Z");
    assert_eq!(rows[2].result, BattleResult::Win);
    assert_eq!(rows[2].trophy_change, 31);
    assert_eq!(rows[2].current_trophies, 7443);
}

#[test]
fn other_game_mode_can_be_selected() {
    let raw = read_fixture("battlelog.json");
    let rows = parse_battlelog_json(&raw, "CW_Battle_1v1").expect("fixture should parse");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].battle_time, "20251016T193001.000Z");
    assert_eq!(rows[0].result, BattleResult::Draw);
    assert_eq!(rows[0].current_trophies, 0);
}

#[test]
fn two_ladder_matches_and_one_other() {
    let raw = r#"[
        {"battleTime": "T1", "gameMode": {"name": "Ladder"},
         "team": [{"trophyChange": 10, "startingTrophies": 100}]},
        {"battleTime": "TX", "gameMode": {"name": "Friendly"},
         "team": [{"trophyChange": 0, "startingTrophies": 0}]},
        {"battleTime": "T2", "gameMode": {"name": "Ladder"},
         "team": [{"trophyChange": -5, "startingTrophies": 110}]}
    ]"#;
    let rows = parse_battlelog_json(raw, "Ladder").expect("should parse");
    assert_eq!(
        rows,
        vec![
            BattleRecord {
                battle_time: "T2".to_string(),
                result: BattleResult::Loss,
                trophy_change: -5,
                current_trophies: 105,
            },
            BattleRecord {
                battle_time: "T1".to_string(),
                result: BattleResult::Win,
                trophy_change: 10,
                current_trophies: 110,
            },
        ]
    );
}

#[test]
fn null_trophy_fields_default_to_zero() {
    let raw = r#"[{"battleTime": "T1", "gameMode": {"name": "Ladder"},
                   "team": [{"trophyChange": null, "startingTrophies": null}]}]"#;
    let rows = parse_battlelog_json(raw, "Ladder").expect("should parse");
    assert_eq!(rows[0].trophy_change, 0);
    assert_eq!(rows[0].current_trophies, 0);
    assert_eq!(rows[0].result, BattleResult::Draw);
}

#[test]
fn game_mode_without_name_is_skipped() {
    let raw = r#"[{"battleTime": "T1", "gameMode": {"id": 1},
                   "team": [{"trophyChange": 3}]}]"#;
    assert!(
        parse_battlelog_json(raw, "Ladder")
            .expect("should parse")
            .is_empty()
    );
}

#[test]
fn null_or_empty_body_is_empty() {
    assert!(
        parse_battlelog_json("null", "Ladder")
            .expect("null should parse")
            .is_empty()
    );
    assert!(
        parse_battlelog_json("  ", "Ladder")
            .expect("blank should parse")
            .is_empty()
    );
    assert!(
        parse_battlelog_json("[]", "Ladder")
            .expect("empty list should parse")
            .is_empty()
    );
}

#[test]
fn non_list_body_is_an_error() {
    assert!(parse_battlelog_json(r#"{"reason": "accessDenied"}"#, "Ladder").is_err());
}
