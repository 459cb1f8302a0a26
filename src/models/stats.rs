//! Per-entity accumulators and derived ranking entries.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ConfidenceLabel, MatchRecord, Role};

/// Match/win tally used by nested breakdowns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCounts {
    pub matches: u32,
    pub wins: u32,
}

impl WinCounts {
    /// Count one match.
    pub fn record(&mut self, winner: bool) {
        self.matches += 1;
        if winner {
            self.wins += 1;
        }
    }

    /// Win rate as a fraction (0.0 to 1.0).
    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches as f64
        }
    }
}

/// The single match with the most combined hero + siege damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub total_damage: f64,
    pub hero_damage: f64,
    pub siege_damage: f64,
    pub map: String,
    /// Player for hero accumulators, hero for player accumulators
    pub counterpart: String,
    pub date: Option<NaiveDate>,
    pub winner: bool,
}

/// Running totals for one hero or player.
///
/// Built fresh by every aggregation call; read-only once the fold is done.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityAccumulator {
    pub name: String,
    /// Role of the first record seen for this entity
    pub role: Role,

    pub matches: u32,
    pub wins: u32,

    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub takedowns: u64,

    pub hero_damage: f64,
    pub siege_damage: f64,
    pub damage_taken: f64,
    pub healing_shielding: f64,
    pub self_healing: f64,
    pub experience: f64,

    pub game_time_seconds: u64,
    pub spent_dead_seconds: u64,
    pub on_fire_seconds: u64,

    pub max_hero_damage: f64,
    pub max_total_damage: f64,
    pub max_damage_taken: f64,
    pub max_healing_shielding: f64,

    pub most_violent: Option<MatchSnapshot>,

    /// Map name -> tally
    pub maps: HashMap<String, WinCounts>,
    /// Opposing dimension (players of a hero, heroes of a player) -> tally
    pub counterparts: HashMap<String, WinCounts>,
}

impl EntityAccumulator {
    /// Create an empty accumulator.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            ..Default::default()
        }
    }

    /// Fold one record into the running totals.
    ///
    /// Maxima only move on a strictly greater value, so the first-seen match
    /// keeps the record on ties.
    pub fn absorb(&mut self, record: &MatchRecord, counterpart: &str) {
        self.matches += 1;
        if record.winner {
            self.wins += 1;
        }

        self.kills += record.kills as u64;
        self.deaths += record.deaths as u64;
        self.assists += record.assists as u64;
        self.takedowns += record.takedowns as u64;

        self.hero_damage += record.hero_damage;
        self.siege_damage += record.siege_damage;
        self.damage_taken += record.damage_taken;
        self.healing_shielding += record.healing_shielding;
        self.self_healing += record.self_healing;
        self.experience += record.experience;

        self.game_time_seconds += record.game_time_seconds as u64;
        self.spent_dead_seconds += record.spent_dead_seconds as u64;
        self.on_fire_seconds += record.on_fire_seconds as u64;

        let total_damage = record.total_damage();
        if record.hero_damage > self.max_hero_damage {
            self.max_hero_damage = record.hero_damage;
        }
        if total_damage > self.max_total_damage {
            self.max_total_damage = total_damage;
            self.most_violent = Some(MatchSnapshot {
                total_damage,
                hero_damage: record.hero_damage,
                siege_damage: record.siege_damage,
                map: record.map.clone(),
                counterpart: counterpart.to_string(),
                date: record.date,
                winner: record.winner,
            });
        }
        if record.damage_taken > self.max_damage_taken {
            self.max_damage_taken = record.damage_taken;
        }
        if record.healing_shielding > self.max_healing_shielding {
            self.max_healing_shielding = record.healing_shielding;
        }

        self.maps
            .entry(label_or_unknown(&record.map))
            .or_default()
            .record(record.winner);
        self.counterparts
            .entry(label_or_unknown(counterpart))
            .or_default()
            .record(record.winner);
    }

    pub fn losses(&self) -> u32 {
        self.matches - self.wins
    }
}

fn label_or_unknown(label: &str) -> String {
    if label.is_empty() {
        "Unknown".to_string()
    } else {
        label.to_string()
    }
}

/// A flattened breakdown row (map or counterpart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub name: String,
    pub matches: u32,
    pub wins: u32,
    pub win_rate: f64,
}

impl BreakdownRow {
    /// Flatten a breakdown map, most-played first; equal counts order by name.
    pub fn from_map(map: &HashMap<String, WinCounts>) -> Vec<Self> {
        let mut rows: Vec<Self> = map
            .iter()
            .map(|(name, counts)| Self {
                name: name.clone(),
                matches: counts.matches,
                wins: counts.wins,
                win_rate: counts.win_rate(),
            })
            .collect();
        rows.sort_by(|a, b| b.matches.cmp(&a.matches).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}

/// Derived, read-only statistics for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub role: Role,

    pub matches: u32,
    pub wins: u32,
    pub losses: u32,

    /// Raw win rate (0.0 to 1.0)
    pub win_rate: f64,
    /// Wilson lower bound of the win rate
    pub win_rate_wilson: f64,
    /// Share of all records in the aggregation
    pub pick_rate: f64,

    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub takedowns: u64,
    pub kda: f64,

    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub avg_takedowns: f64,

    pub hero_damage: f64,
    pub siege_damage: f64,
    pub avg_hero_damage: f64,
    pub avg_siege_damage: f64,
    pub avg_total_damage: f64,
    pub avg_damage_taken: f64,
    pub avg_healing_shielding: f64,
    pub avg_self_healing: f64,
    pub avg_experience: f64,
    pub avg_spent_dead_seconds: f64,
    pub avg_game_time_seconds: f64,
    pub avg_on_fire_seconds: f64,

    /// Total damage per minute
    pub dpm: f64,
    pub hero_dpm: f64,
    pub kills_per_min: f64,
    pub deaths_per_min: f64,
    pub healing_per_min: f64,

    pub max_hero_damage: f64,
    pub max_total_damage: f64,
    pub max_damage_taken: f64,
    pub max_healing_shielding: f64,
    pub most_violent: Option<MatchSnapshot>,

    pub low_sample: bool,
    pub confidence: ConfidenceLabel,

    pub maps: Vec<BreakdownRow>,
    pub counterparts: Vec<BreakdownRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_counts() {
        let mut counts = WinCounts::default();
        assert_eq!(counts.win_rate(), 0.0);
        counts.record(true);
        counts.record(false);
        counts.record(true);
        assert_eq!(counts.matches, 3);
        assert_eq!(counts.wins, 2);
        assert!((counts.win_rate() - 0.667).abs() < 0.001);
    }

    #[test]
    fn test_absorb_sums_and_breakdowns() {
        let mut acc = EntityAccumulator::new("Muradin", Role::Tank);
        acc.absorb(
            &MatchRecord::new("Ana", "Muradin")
                .with_map("Towers of Doom")
                .with_win(true)
                .with_kda(3, 1, 9),
            "Ana",
        );
        acc.absorb(
            &MatchRecord::new("Bo", "Muradin")
                .with_map("Towers of Doom")
                .with_kda(1, 5, 2),
            "Bo",
        );

        assert_eq!(acc.matches, 2);
        assert_eq!(acc.wins, 1);
        assert_eq!(acc.losses(), 1);
        assert_eq!(acc.kills, 4);
        assert_eq!(acc.deaths, 6);
        assert_eq!(acc.assists, 11);
        assert_eq!(acc.maps["Towers of Doom"], WinCounts { matches: 2, wins: 1 });
        assert_eq!(acc.counterparts["Ana"], WinCounts { matches: 1, wins: 1 });
        assert_eq!(acc.counterparts["Bo"], WinCounts { matches: 1, wins: 0 });
    }

    #[test]
    fn test_absorb_max_keeps_first_on_tie() {
        let mut acc = EntityAccumulator::new("Valla", Role::RangedAssassin);
        acc.absorb(
            &MatchRecord::new("First", "Valla").with_damage(50_000.0, 10_000.0),
            "First",
        );
        acc.absorb(
            &MatchRecord::new("Second", "Valla").with_damage(40_000.0, 20_000.0),
            "Second",
        );

        assert_eq!(acc.max_total_damage, 60_000.0);
        assert_eq!(acc.max_hero_damage, 50_000.0);
        assert_eq!(acc.most_violent.as_ref().unwrap().counterpart, "First");
    }

    #[test]
    fn test_absorb_unknown_map_label() {
        let mut acc = EntityAccumulator::new("Valla", Role::RangedAssassin);
        acc.absorb(&MatchRecord::new("", "Valla"), "");
        assert_eq!(acc.maps["Unknown"].matches, 1);
        assert_eq!(acc.counterparts["Unknown"].matches, 1);
    }

    #[test]
    fn test_breakdown_rows_sorted() {
        let mut map = HashMap::new();
        map.insert("B".to_string(), WinCounts { matches: 2, wins: 1 });
        map.insert("A".to_string(), WinCounts { matches: 2, wins: 2 });
        map.insert("C".to_string(), WinCounts { matches: 5, wins: 0 });

        let rows = BreakdownRow::from_map(&map);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(rows[1].win_rate, 1.0);
    }
}
