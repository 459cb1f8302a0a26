//! Record normalization.
//!
//! Turns raw export rows into canonical [`MatchRecord`]s. Normalization never
//! fails: a field that cannot be coerced falls back to its typed default.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::models::{value_to_text, MatchRecord, RawRecord, Role, RoleTable};

const TRUTHY: &[&str] = &["true", "yes", "win", "won", "1", "victory", "si", "sí"];
const FALSY: &[&str] = &["false", "no", "loss", "lost", "0", "defeat", "derrota"];

/// Parse a win flag from any of its textual, boolean or numeric encodings.
///
/// Anything outside the known vocabulary counts as a loss.
pub fn parse_winner(value: Option<&Value>) -> bool {
    let Some(value) = value else {
        return false;
    };

    match value {
        Value::Bool(b) => *b,
        Value::Number(n) if n.as_f64() == Some(1.0) => true,
        Value::Number(n) if n.as_f64() == Some(0.0) => false,
        other => {
            let text = value_to_text(other).to_lowercase();
            if TRUTHY.contains(&text.as_str()) {
                true
            } else if FALSY.contains(&text.as_str()) {
                false
            } else {
                debug!("Unrecognised win flag {:?}, treating as loss", text);
                false
            }
        }
    }
}

/// Parse a duration given as integer seconds, `mm:ss` or `hh:mm:ss`.
///
/// Malformed input yields 0.
pub fn parse_game_time(value: Option<&Value>) -> u32 {
    let Some(value) = value else {
        return 0;
    };

    let seconds = match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 => f.trunc() as u64,
            _ => 0,
        },
        Value::String(s) => parse_clock(s.trim()),
        _ => 0,
    };

    u32::try_from(seconds).unwrap_or(u32::MAX)
}

fn parse_clock(text: &str) -> u64 {
    if text.is_empty() {
        return 0;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().unwrap_or(0);
    }

    let parts: Vec<u64> = text.split(':').map(leading_int).collect();
    match parts.as_slice() {
        [h, m, s] => h
            .saturating_mul(3600)
            .saturating_add(m.saturating_mul(60))
            .saturating_add(*s),
        [m, s] => m.saturating_mul(60).saturating_add(*s),
        _ => 0,
    }
}

/// Leading decimal digits of `text` as an integer; 0 when there are none.
fn leading_int(text: &str) -> u64 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Coerce a field to a finite, non-negative number, or `default`.
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        Some(_) => None,
    };

    match parsed {
        Some(n) if n.is_finite() && n >= 0.0 => n,
        _ => default,
    }
}

/// Coerce a counter field to a non-negative integer (fractions truncated).
pub fn coerce_count(value: Option<&Value>) -> u32 {
    let n = coerce_number(value, 0.0).trunc();
    if n >= u32::MAX as f64 {
        u32::MAX
    } else {
        n as u32
    }
}

fn full_date_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("static pattern"))
}

fn month_day_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-(\d{2})-(\d{2})").expect("static pattern"))
}

fn loose_ymd_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})").expect("static pattern")
    })
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Reconstruct the match date from the replay file name, year and date columns.
///
/// Tried in order: a `YYYY-MM-DD` file-name prefix, the `Year` column joined
/// with a `-MM-DD` file-name prefix, then the generic `Date` column.
pub fn reconstruct_date(row: &RawRecord) -> Option<NaiveDate> {
    let file_name = row
        .first_of(&["FileName", "Name"])
        .map(value_to_text)
        .unwrap_or_default();

    if let Some(caps) = full_date_prefix().captures(&file_name) {
        if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
            return Some(date);
        }
    }

    let year = row.text("Year");
    if !year.is_empty() {
        if let Some(caps) = month_day_prefix().captures(&file_name) {
            let year = leading_int(&year).to_string();
            if let Some(date) = ymd(&year, &caps[1], &caps[2]) {
                return Some(date);
            }
        }
    }

    let date = row.text("Date");
    if !date.is_empty() {
        return parse_generic_date(&date);
    }

    None
}

/// Parse a free-form date column.
pub fn parse_generic_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    loose_ymd_prefix()
        .captures(text)
        .and_then(|caps| ymd(&caps[1], &caps[2], &caps[3]))
}

/// Summary of a normalized dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub total_rows: usize,
    pub undated_rows: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub players: Vec<String>,
    pub heroes: Vec<String>,
    pub maps: Vec<String>,
    /// Roles seen, excluding `Unknown`
    pub roles: Vec<Role>,
}

impl DatasetMeta {
    /// Collect metadata from already-normalized records.
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut players = BTreeSet::new();
        let mut heroes = BTreeSet::new();
        let mut maps = BTreeSet::new();
        let mut roles = BTreeSet::new();
        let mut date_min: Option<NaiveDate> = None;
        let mut date_max: Option<NaiveDate> = None;
        let mut undated_rows = 0;

        for record in records {
            if !record.player_name.is_empty() {
                players.insert(record.player_name.clone());
            }
            if !record.hero_name.is_empty() {
                heroes.insert(record.hero_name.clone());
            }
            if !record.map.is_empty() {
                maps.insert(record.map.clone());
            }
            if record.role != Role::Unknown {
                roles.insert(record.role);
            }
            match record.date {
                Some(date) => {
                    date_min = Some(date_min.map_or(date, |d| d.min(date)));
                    date_max = Some(date_max.map_or(date, |d| d.max(date)));
                }
                None => undated_rows += 1,
            }
        }

        Self {
            total_rows: records.len(),
            undated_rows,
            date_min,
            date_max,
            players: players.into_iter().collect(),
            heroes: heroes.into_iter().collect(),
            maps: maps.into_iter().collect(),
            roles: roles.into_iter().collect(),
        }
    }
}

/// Normalized records plus their metadata.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDataset {
    pub records: Vec<MatchRecord>,
    pub meta: DatasetMeta,
}

/// Converts raw rows into [`MatchRecord`]s using an injected role table.
#[derive(Debug, Clone)]
pub struct Normalizer {
    roles: RoleTable,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(RoleTable::builtin())
    }
}

impl Normalizer {
    pub fn new(roles: RoleTable) -> Self {
        Self { roles }
    }

    /// Normalize one raw row.
    pub fn normalize(&self, row: &RawRecord) -> MatchRecord {
        let hero_name = row.text("HeroName");

        // An explicit role column wins over the static table.
        let role = Role::from_label(&row.text("Role"))
            .unwrap_or_else(|| self.roles.role_of(&hero_name));

        let replay_id = row
            .first_of(&["FileName", "Name"])
            .map(value_to_text)
            .unwrap_or_default();

        let date = reconstruct_date(row);
        if date.is_none() {
            debug!("No usable date for replay {:?}", replay_id);
        }

        MatchRecord {
            player_name: row.text("PlayerName"),
            hero_name,
            map: row.text("Map"),
            replay_id,
            role,
            date,
            game_time_seconds: parse_game_time(row.get("GameTime")),
            winner: parse_winner(row.get("Winner")),
            kills: coerce_count(row.get("HeroKills")),
            deaths: coerce_count(row.get("Deaths")),
            assists: coerce_count(row.get("Assists")),
            takedowns: coerce_count(row.get("Takedowns")),
            hero_damage: coerce_number(row.get("HeroDamage"), 0.0),
            siege_damage: coerce_number(row.get("TotalSiegeDamage"), 0.0),
            damage_taken: coerce_number(row.get("DamageTaken"), 0.0),
            healing_shielding: coerce_number(row.get("HealingShielding"), 0.0),
            self_healing: coerce_number(row.get("SelfHealing"), 0.0),
            experience: coerce_number(row.get("Experience"), 0.0),
            spent_dead_seconds: parse_game_time(row.get("SpentDead")),
            on_fire_seconds: parse_game_time(row.get("OnFire")),
            team: row.text("Team"),
            game_mode: row.text("GameMode"),
            award: row.text("Award"),
        }
    }

    /// Normalize every row and collect dataset metadata.
    pub fn normalize_all(&self, rows: &[RawRecord]) -> NormalizedDataset {
        let records: Vec<MatchRecord> = rows.iter().map(|row| self.normalize(row)).collect();
        let meta = DatasetMeta::from_records(&records);

        info!(
            "Normalized {} rows ({} undated, {} players, {} heroes)",
            meta.total_rows,
            meta.undated_rows,
            meta.players.len(),
            meta.heroes.len()
        );

        NormalizedDataset { records, meta }
    }
}

/// Normalize one row against the builtin role table.
pub fn normalize_record(row: &RawRecord) -> MatchRecord {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default).normalize(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_winner_vocabulary() {
        for truthy in ["true", "TRUE", " Yes ", "win", "Won", "1", "Victory", "si", "Sí"] {
            assert!(parse_winner(Some(&json!(truthy))), "{truthy}");
        }
        for falsy in ["false", "No", "loss", "lost", "0", "defeat", "Derrota"] {
            assert!(!parse_winner(Some(&json!(falsy))), "{falsy}");
        }
    }

    #[test]
    fn test_parse_winner_typed_and_unknown() {
        assert!(parse_winner(Some(&json!(true))));
        assert!(!parse_winner(Some(&json!(false))));
        assert!(parse_winner(Some(&json!(1))));
        assert!(!parse_winner(Some(&json!(0))));
        assert!(!parse_winner(Some(&json!(2))));
        assert!(!parse_winner(Some(&json!("maybe"))));
        assert!(!parse_winner(Some(&json!(""))));
        assert!(!parse_winner(None));
    }

    #[test]
    fn test_parse_game_time_formats() {
        assert_eq!(parse_game_time(Some(&json!("1234"))), 1234);
        assert_eq!(parse_game_time(Some(&json!("12:34"))), 754);
        assert_eq!(parse_game_time(Some(&json!("1:02:03"))), 3723);
        assert_eq!(parse_game_time(Some(&json!(95))), 95);
        assert_eq!(parse_game_time(Some(&json!(95.7))), 95);
    }

    #[test]
    fn test_parse_game_time_malformed() {
        assert_eq!(parse_game_time(None), 0);
        assert_eq!(parse_game_time(Some(&json!(""))), 0);
        assert_eq!(parse_game_time(Some(&json!("abc"))), 0);
        assert_eq!(parse_game_time(Some(&json!("1:2:3:4"))), 0);
        assert_eq!(parse_game_time(Some(&json!("12.5"))), 0);
        assert_eq!(parse_game_time(Some(&json!("xx:30"))), 30);
        assert_eq!(parse_game_time(Some(&json!(-5))), 0);
        assert_eq!(parse_game_time(Some(&json!(true))), 0);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some(&json!("42.5")), 0.0), 42.5);
        assert_eq!(coerce_number(Some(&json!(" 7 ")), 0.0), 7.0);
        assert_eq!(coerce_number(Some(&json!(1500)), 0.0), 1500.0);
        assert_eq!(coerce_number(Some(&json!("")), 3.0), 3.0);
        assert_eq!(coerce_number(Some(&json!(null)), 3.0), 3.0);
        assert_eq!(coerce_number(None, 3.0), 3.0);
        assert_eq!(coerce_number(Some(&json!("n/a")), 0.0), 0.0);
        assert_eq!(coerce_number(Some(&json!("NaN")), 0.0), 0.0);
        assert_eq!(coerce_number(Some(&json!("inf")), 0.0), 0.0);
        assert_eq!(coerce_number(Some(&json!(-3)), 0.0), 0.0);
    }

    #[test]
    fn test_coerce_count_truncates() {
        assert_eq!(coerce_count(Some(&json!("7.9"))), 7);
        assert_eq!(coerce_count(Some(&json!("oops"))), 0);
        assert_eq!(coerce_count(Some(&json!(1e20))), u32::MAX);
    }

    #[test]
    fn test_date_from_full_file_name() {
        let row = RawRecord::new().with("FileName", "2025-03-14 20.11.05 Cursed Hollow.StormReplay");
        assert_eq!(reconstruct_date(&row), NaiveDate::from_ymd_opt(2025, 3, 14));
    }

    #[test]
    fn test_date_from_year_and_month_day() {
        let row = RawRecord::new()
            .with("Year", "2024")
            .with("FileName", "-11-02 21.40.12 Braxis Holdout.StormReplay");
        assert_eq!(reconstruct_date(&row), NaiveDate::from_ymd_opt(2024, 11, 2));

        let numeric_year = RawRecord::new()
            .with("Year", 2024)
            .with("Name", "-01-09 10.00.00 Dragon Shire.StormReplay");
        assert_eq!(reconstruct_date(&numeric_year), NaiveDate::from_ymd_opt(2024, 1, 9));
    }

    #[test]
    fn test_date_falls_back_to_date_column() {
        let row = RawRecord::new()
            .with("FileName", "Garden of Terror.StormReplay")
            .with("Date", "05/06/2023");
        assert_eq!(reconstruct_date(&row), NaiveDate::from_ymd_opt(2023, 6, 5));

        let iso = RawRecord::new().with("Date", "2023-07-01T18:30:00Z");
        assert_eq!(reconstruct_date(&iso), NaiveDate::from_ymd_opt(2023, 7, 1));

        let with_time = RawRecord::new().with("Date", "2023/7/4 18:30");
        assert_eq!(reconstruct_date(&with_time), NaiveDate::from_ymd_opt(2023, 7, 4));
    }

    #[test]
    fn test_date_unrecoverable() {
        assert_eq!(reconstruct_date(&RawRecord::new()), None);

        let no_year = RawRecord::new().with("FileName", "-11-02 21.40.12 Braxis.StormReplay");
        assert_eq!(reconstruct_date(&no_year), None);

        let impossible = RawRecord::new()
            .with("Year", "2024")
            .with("FileName", "-02-30 21.40.12 Braxis.StormReplay");
        assert_eq!(reconstruct_date(&impossible), None);

        let garbage = RawRecord::new().with("Date", "last tuesday");
        assert_eq!(reconstruct_date(&garbage), None);
    }

    #[test]
    fn test_normalize_full_row() {
        let row: RawRecord = serde_json::from_value(json!({
            "PlayerName": " Ana ",
            "HeroName": "Muradin",
            "Map": "Towers of Doom",
            "FileName": "2025-01-05 19.00.00 Towers of Doom.StormReplay",
            "Winner": "Victory",
            "GameTime": "18:30",
            "HeroKills": "4",
            "Deaths": 2,
            "Assists": "11",
            "Takedowns": "15",
            "HeroDamage": "35120",
            "TotalSiegeDamage": "41000.5",
            "DamageTaken": "88000",
            "HealingShielding": "",
            "SelfHealing": "12000",
            "Experience": "9000",
            "SpentDead": "1:05",
            "OnFire": "95",
            "Team": "Blue",
            "GameMode": "Storm League",
            "Award": "MVP"
        }))
        .unwrap();

        let record = Normalizer::default().normalize(&row);

        assert_eq!(record.player_name, "Ana");
        assert_eq!(record.role, Role::Tank);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 1, 5));
        assert!(record.winner);
        assert_eq!(record.game_time_seconds, 1110);
        assert_eq!(record.kills, 4);
        assert_eq!(record.deaths, 2);
        assert_eq!(record.assists, 11);
        assert_eq!(record.takedowns, 15);
        assert_eq!(record.siege_damage, 41000.5);
        assert_eq!(record.healing_shielding, 0.0);
        assert_eq!(record.spent_dead_seconds, 65);
        assert_eq!(record.on_fire_seconds, 95);
        assert_eq!(record.replay_id, "2025-01-05 19.00.00 Towers of Doom.StormReplay");
        assert_eq!(record.award, "MVP");
    }

    #[test]
    fn test_normalize_empty_row_is_zeroed() {
        let record = Normalizer::default().normalize(&RawRecord::new());
        assert_eq!(record, MatchRecord::default());
    }

    #[test]
    fn test_role_column_overrides_table() {
        let row = RawRecord::new()
            .with("HeroName", "Muradin")
            .with("Role", "melee assasin");
        assert_eq!(Normalizer::default().normalize(&row).role, Role::MeleeAssassin);

        let bogus = RawRecord::new().with("HeroName", "Muradin").with("Role", "???");
        assert_eq!(Normalizer::default().normalize(&bogus).role, Role::Tank);
    }

    #[test]
    fn test_injected_role_table() {
        let table: RoleTable = [("Fixture", Role::Support)].into_iter().collect();
        let normalizer = Normalizer::new(table);
        let record = normalizer.normalize(&RawRecord::new().with("HeroName", "Fixture"));
        assert_eq!(record.role, Role::Support);
        let record = normalizer.normalize(&RawRecord::new().with("HeroName", "Muradin"));
        assert_eq!(record.role, Role::Unknown);
    }

    #[test]
    fn test_normalize_all_meta() {
        let rows = vec![
            RawRecord::new()
                .with("PlayerName", "Bo")
                .with("HeroName", "Valla")
                .with("Map", "Sky Temple")
                .with("Date", "2024-02-01"),
            RawRecord::new()
                .with("PlayerName", "Ana")
                .with("HeroName", "Muradin")
                .with("Map", "Sky Temple")
                .with("Date", "2025-06-10"),
            RawRecord::new().with("PlayerName", "Ana").with("HeroName", "Nobody"),
        ];

        let dataset = Normalizer::default().normalize_all(&rows);

        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.meta.total_rows, 3);
        assert_eq!(dataset.meta.undated_rows, 1);
        assert_eq!(dataset.meta.players, vec!["Ana", "Bo"]);
        assert_eq!(dataset.meta.heroes, vec!["Muradin", "Nobody", "Valla"]);
        assert_eq!(dataset.meta.maps, vec!["Sky Temple"]);
        assert_eq!(dataset.meta.roles, vec![Role::Tank, Role::RangedAssassin]);
        assert_eq!(dataset.meta.date_min, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(dataset.meta.date_max, NaiveDate::from_ymd_opt(2025, 6, 10));
    }

    #[test]
    fn test_normalize_record_uses_builtin_table() {
        let row = RawRecord::new()
            .with("HeroName", "Muradin")
            .with("Winner", "Victory");
        let record = normalize_record(&row);
        assert_eq!(record.role, Role::Tank);
        assert!(record.winner);
    }
}
