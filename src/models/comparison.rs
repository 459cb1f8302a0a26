//! Year-over-year comparison models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{RankingEntry, Role};

/// Changes smaller than this (in absolute value) count as flat.
pub const FLAT_EPSILON: f64 = 0.01;

/// Direction of a change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Flat => write!(f, "flat"),
        }
    }
}

/// Difference between a baseline and a later value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub absolute: f64,
    pub percentage: f64,
    pub direction: Direction,
}

impl Delta {
    /// Compute the delta from `first` to `last`.
    ///
    /// A zero baseline reports 100% when the later value is non-zero and 0%
    /// otherwise.
    pub fn between(first: f64, last: f64) -> Self {
        let absolute = last - first;

        let percentage = if first != 0.0 {
            absolute / first * 100.0
        } else if last != 0.0 {
            100.0
        } else {
            0.0
        };

        let direction = if absolute > FLAT_EPSILON {
            Direction::Up
        } else if absolute < -FLAT_EPSILON {
            Direction::Down
        } else {
            Direction::Flat
        };

        Self {
            absolute,
            percentage,
            direction,
        }
    }
}

/// One entity's figures for one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearAggregate {
    pub matches: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub win_rate_wilson: f64,
    pub kda: f64,
    pub avg_hero_damage: f64,
    pub avg_total_damage: f64,
    pub dpm: f64,
}

impl From<&RankingEntry> for YearAggregate {
    fn from(entry: &RankingEntry) -> Self {
        Self {
            matches: entry.matches,
            wins: entry.wins,
            win_rate: entry.win_rate,
            win_rate_wilson: entry.win_rate_wilson,
            kda: entry.kda,
            avg_hero_damage: entry.avg_hero_damage,
            avg_total_damage: entry.avg_total_damage,
            dpm: entry.dpm,
        }
    }
}

/// Metric a comparison delta can be computed and ranked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMetric {
    Matches,
    WinRate,
    Kda,
    AvgHeroDamage,
    AvgTotalDamage,
}

impl ChangeMetric {
    pub const ALL: [ChangeMetric; 5] = [
        ChangeMetric::Matches,
        ChangeMetric::WinRate,
        ChangeMetric::Kda,
        ChangeMetric::AvgHeroDamage,
        ChangeMetric::AvgTotalDamage,
    ];

    /// Read this metric off a year aggregate.
    pub fn value(&self, year: &YearAggregate) -> f64 {
        match self {
            ChangeMetric::Matches => year.matches as f64,
            ChangeMetric::WinRate => year.win_rate,
            ChangeMetric::Kda => year.kda,
            ChangeMetric::AvgHeroDamage => year.avg_hero_damage,
            ChangeMetric::AvgTotalDamage => year.avg_total_damage,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeMetric::Matches => "matches",
            ChangeMetric::WinRate => "win_rate",
            ChangeMetric::Kda => "kda",
            ChangeMetric::AvgHeroDamage => "avg_hero_damage",
            ChangeMetric::AvgTotalDamage => "avg_total_damage",
        }
    }
}

impl std::str::FromStr for ChangeMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ChangeMetric::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| format!("unknown change metric: {}", s))
    }
}

/// Deltas between the earliest and latest selected year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Changes {
    pub matches: Delta,
    pub win_rate: Delta,
    pub kda: Delta,
    pub avg_hero_damage: Delta,
    pub avg_total_damage: Delta,
}

impl Changes {
    /// Compute every delta from `first` to `last`.
    pub fn between(first: &YearAggregate, last: &YearAggregate) -> Self {
        let delta = |m: ChangeMetric| Delta::between(m.value(first), m.value(last));
        Self {
            matches: delta(ChangeMetric::Matches),
            win_rate: delta(ChangeMetric::WinRate),
            kda: delta(ChangeMetric::Kda),
            avg_hero_damage: delta(ChangeMetric::AvgHeroDamage),
            avg_total_damage: delta(ChangeMetric::AvgTotalDamage),
        }
    }

    pub fn get(&self, metric: ChangeMetric) -> &Delta {
        match metric {
            ChangeMetric::Matches => &self.matches,
            ChangeMetric::WinRate => &self.win_rate,
            ChangeMetric::Kda => &self.kda,
            ChangeMetric::AvgHeroDamage => &self.avg_hero_damage,
            ChangeMetric::AvgTotalDamage => &self.avg_total_damage,
        }
    }
}

/// One entity across every selected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub name: String,
    pub role: Role,
    /// Every selected year is present; absent years are zeroed.
    pub years: BTreeMap<i32, YearAggregate>,
    /// Present only when at least two distinct years were selected
    pub changes: Option<Changes>,
}

impl ComparisonEntry {
    /// Aggregate for the earliest selected year.
    pub fn baseline(&self) -> Option<&YearAggregate> {
        self.years.values().next()
    }

    /// Aggregate for the latest selected year.
    pub fn latest(&self) -> Option<&YearAggregate> {
        self.years.values().next_back()
    }
}
