//! Dataset-wide overview figures and over-time series.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::rank::{bucket_by, iso_week_label, month_label, PeriodBucket};
use super::safe_divide;
use crate::models::{BreakdownRow, MatchRecord, Role, WinCounts};

/// Headline numbers for a record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_matches: u32,
    pub wins: u32,
    pub win_rate: f64,

    pub avg_hero_damage: f64,
    pub avg_deaths: f64,
    pub avg_spent_dead_seconds: f64,
    pub avg_game_time_seconds: f64,
    pub avg_kills: f64,
    pub avg_assists: f64,
    pub avg_takedowns: f64,

    pub total_kills: u64,
    pub total_deaths: u64,
    pub total_assists: u64,
}

/// A collection length as a `u32` match count, clamped at `u32::MAX`.
pub fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Compute the overview for a record set; all zero when empty.
pub fn overview(records: &[MatchRecord]) -> OverviewMetrics {
    let mut metrics = OverviewMetrics {
        total_matches: saturating_count(records.len()),
        ..Default::default()
    };

    let mut hero_damage = 0.0;
    let mut spent_dead = 0u64;
    let mut game_time = 0u64;
    let mut takedowns = 0u64;

    for record in records {
        if record.winner {
            metrics.wins += 1;
        }
        metrics.total_kills += record.kills as u64;
        metrics.total_deaths += record.deaths as u64;
        metrics.total_assists += record.assists as u64;
        hero_damage += record.hero_damage;
        spent_dead += record.spent_dead_seconds as u64;
        game_time += record.game_time_seconds as u64;
        takedowns += record.takedowns as u64;
    }

    let n = records.len() as f64;
    metrics.win_rate = safe_divide(metrics.wins as f64, n);
    metrics.avg_hero_damage = safe_divide(hero_damage, n);
    metrics.avg_deaths = safe_divide(metrics.total_deaths as f64, n);
    metrics.avg_spent_dead_seconds = safe_divide(spent_dead as f64, n);
    metrics.avg_game_time_seconds = safe_divide(game_time as f64, n);
    metrics.avg_kills = safe_divide(metrics.total_kills as f64, n);
    metrics.avg_assists = safe_divide(metrics.total_assists as f64, n);
    metrics.avg_takedowns = safe_divide(takedowns as f64, n);

    metrics
}

/// How often one role was played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleShare {
    pub role: Role,
    pub count: u32,
    /// Fraction of all records (0.0 to 1.0)
    pub share: f64,
}

/// Records per role, most played first; equal counts follow role order.
pub fn role_distribution(records: &[MatchRecord]) -> Vec<RoleShare> {
    let mut counts: HashMap<Role, u32> = HashMap::new();
    for record in records {
        *counts.entry(record.role).or_default() += 1;
    }

    let total = records.len() as f64;
    let mut shares: Vec<RoleShare> = counts
        .into_iter()
        .map(|(role, count)| RoleShare {
            role,
            count,
            share: safe_divide(count as f64, total),
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.role.cmp(&b.role)));
    shares
}

/// Matches and win rate per map, most played first.
pub fn maps_table(records: &[MatchRecord]) -> Vec<BreakdownRow> {
    let mut maps: HashMap<String, WinCounts> = HashMap::new();
    for record in records {
        let name = if record.map.is_empty() {
            "Unknown"
        } else {
            record.map.as_str()
        };
        maps.entry(name.to_string()).or_default().record(record.winner);
    }
    BreakdownRow::from_map(&maps)
}

/// Bucket width chosen for an over-time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    Month,
}

/// Matches over time, oldest bucket first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchesOverTime {
    pub granularity: Granularity,
    pub buckets: Vec<PeriodBucket>,
}

/// Weekly match counts; monthly when fewer than half the records are dated.
///
/// Undated records never land in a bucket.
pub fn matches_over_time(records: &[MatchRecord]) -> MatchesOverTime {
    let all: Vec<&MatchRecord> = records.iter().collect();
    let dated = records.iter().filter(|r| r.date.is_some()).count();

    if dated * 2 < records.len() {
        MatchesOverTime {
            granularity: Granularity::Month,
            buckets: bucket_by(&all, month_label),
        }
    } else {
        MatchesOverTime {
            granularity: Granularity::Week,
            buckets: bucket_by(&all, iso_week_label),
        }
    }
}
