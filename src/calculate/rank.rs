//! Leaderboards, full tables and single-entity profiles.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{aggregate, derive_rates_with, safe_divide, GroupKey, RateOptions};
use crate::models::{BreakdownRow, EntityAccumulator, MatchRecord, RankingEntry, Role};

/// Minimum shared matches before a counterpart can be a "best partner".
pub const TOP_COUNTERPART_MIN_MATCHES: u32 = 3;
/// Number of counterparts reported in a profile.
pub const TOP_COUNTERPART_LIMIT: usize = 3;

/// A rankable field of [`RankingEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Matches,
    Wins,
    WinRate,
    WinRateWilson,
    PickRate,
    Kda,
    Dpm,
    HeroDpm,
    KillsPerMin,
    DeathsPerMin,
    AvgTotalDamage,
    AvgHeroDamage,
    AvgSiegeDamage,
    AvgHealingShielding,
    AvgKills,
    AvgDeaths,
    AvgAssists,
    AvgSpentDeadSeconds,
    AvgDamageTaken,
    AvgGameTimeSeconds,
    MaxTotalDamage,
    MaxHeroDamage,
    MaxDamageTaken,
    MaxHealingShielding,
}

impl Metric {
    pub const ALL: [Metric; 24] = [
        Metric::Matches,
        Metric::Wins,
        Metric::WinRate,
        Metric::WinRateWilson,
        Metric::PickRate,
        Metric::Kda,
        Metric::Dpm,
        Metric::HeroDpm,
        Metric::KillsPerMin,
        Metric::DeathsPerMin,
        Metric::AvgTotalDamage,
        Metric::AvgHeroDamage,
        Metric::AvgSiegeDamage,
        Metric::AvgHealingShielding,
        Metric::AvgKills,
        Metric::AvgDeaths,
        Metric::AvgAssists,
        Metric::AvgSpentDeadSeconds,
        Metric::AvgDamageTaken,
        Metric::AvgGameTimeSeconds,
        Metric::MaxTotalDamage,
        Metric::MaxHeroDamage,
        Metric::MaxDamageTaken,
        Metric::MaxHealingShielding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Matches => "matches",
            Metric::Wins => "wins",
            Metric::WinRate => "win_rate",
            Metric::WinRateWilson => "win_rate_wilson",
            Metric::PickRate => "pick_rate",
            Metric::Kda => "kda",
            Metric::Dpm => "dpm",
            Metric::HeroDpm => "hero_dpm",
            Metric::KillsPerMin => "kills_per_min",
            Metric::DeathsPerMin => "deaths_per_min",
            Metric::AvgTotalDamage => "avg_total_damage",
            Metric::AvgHeroDamage => "avg_hero_damage",
            Metric::AvgSiegeDamage => "avg_siege_damage",
            Metric::AvgHealingShielding => "avg_healing_shielding",
            Metric::AvgKills => "avg_kills",
            Metric::AvgDeaths => "avg_deaths",
            Metric::AvgAssists => "avg_assists",
            Metric::AvgSpentDeadSeconds => "avg_spent_dead_seconds",
            Metric::AvgDamageTaken => "avg_damage_taken",
            Metric::AvgGameTimeSeconds => "avg_game_time_seconds",
            Metric::MaxTotalDamage => "max_total_damage",
            Metric::MaxHeroDamage => "max_hero_damage",
            Metric::MaxDamageTaken => "max_damage_taken",
            Metric::MaxHealingShielding => "max_healing_shielding",
        }
    }

    /// Whether a smaller value ranks better (deaths, time dead).
    pub fn lower_is_better(&self) -> bool {
        matches!(
            self,
            Metric::AvgDeaths | Metric::AvgSpentDeadSeconds | Metric::DeathsPerMin
        )
    }

    /// Read this metric off an entry.
    pub fn value(&self, entry: &RankingEntry) -> f64 {
        match self {
            Metric::Matches => entry.matches as f64,
            Metric::Wins => entry.wins as f64,
            Metric::WinRate => entry.win_rate,
            Metric::WinRateWilson => entry.win_rate_wilson,
            Metric::PickRate => entry.pick_rate,
            Metric::Kda => entry.kda,
            Metric::Dpm => entry.dpm,
            Metric::HeroDpm => entry.hero_dpm,
            Metric::KillsPerMin => entry.kills_per_min,
            Metric::DeathsPerMin => entry.deaths_per_min,
            Metric::AvgTotalDamage => entry.avg_total_damage,
            Metric::AvgHeroDamage => entry.avg_hero_damage,
            Metric::AvgSiegeDamage => entry.avg_siege_damage,
            Metric::AvgHealingShielding => entry.avg_healing_shielding,
            Metric::AvgKills => entry.avg_kills,
            Metric::AvgDeaths => entry.avg_deaths,
            Metric::AvgAssists => entry.avg_assists,
            Metric::AvgSpentDeadSeconds => entry.avg_spent_dead_seconds,
            Metric::AvgDamageTaken => entry.avg_damage_taken,
            Metric::AvgGameTimeSeconds => entry.avg_game_time_seconds,
            Metric::MaxTotalDamage => entry.max_total_damage,
            Metric::MaxHeroDamage => entry.max_hero_damage,
            Metric::MaxDamageTaken => entry.max_damage_taken,
            Metric::MaxHealingShielding => entry.max_healing_shielding,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| format!("unknown metric: {}", s))
    }
}

/// Top `top_n` entries by `metric`, skipping entries under `min_matches`.
///
/// The sort is stable: entries with equal values keep their input order.
pub fn top_by<'a>(
    entries: &'a [RankingEntry],
    metric: Metric,
    top_n: usize,
    min_matches: u32,
    ascending: bool,
) -> Vec<&'a RankingEntry> {
    let mut ranked: Vec<&RankingEntry> = entries
        .iter()
        .filter(|e| e.matches >= min_matches)
        .collect();

    ranked.sort_by(|a, b| {
        let ordering = metric.value(a).total_cmp(&metric.value(b));
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    ranked.truncate(top_n);
    ranked
}

/// Aggregate and derive every entity, in first-seen order.
pub fn build_table(records: &[MatchRecord], key: GroupKey, options: &RateOptions) -> Vec<RankingEntry> {
    aggregate(records, key).derive(options)
}

/// Matches and wins for one period bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    /// `YYYY-Www` for weeks, `YYYY-MM` for months
    pub period: String,
    pub matches: u32,
    pub wins: u32,
    pub win_rate: f64,
}

/// Count dated records into labelled buckets, sorted by label.
pub(crate) fn bucket_by<F>(records: &[&MatchRecord], label: F) -> Vec<PeriodBucket>
where
    F: Fn(chrono::NaiveDate) -> String,
{
    let mut buckets: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for record in records {
        let Some(date) = record.date else { continue };
        let (matches, wins) = buckets.entry(label(date)).or_default();
        *matches += 1;
        if record.winner {
            *wins += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(period, (matches, wins))| PeriodBucket {
            period,
            matches,
            wins,
            win_rate: safe_divide(wins as f64, matches as f64),
        })
        .collect()
}

/// ISO week label, e.g. `2024-W07`.
pub fn iso_week_label(date: chrono::NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Calendar month label, e.g. `2024-02`.
pub fn month_label(date: chrono::NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Everything shown for one hero or player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
    pub entry: RankingEntry,
    /// Weekly matches and win rate, oldest first
    pub trend: Vec<PeriodBucket>,
    /// Best counterparts by win rate
    pub top_counterparts: Vec<BreakdownRow>,
}

/// Profile of one entity; a zeroed entry when it has no records.
pub fn entity_profile(
    records: &[MatchRecord],
    name: &str,
    key: GroupKey,
    options: &RateOptions,
) -> EntityProfile {
    let own: Vec<&MatchRecord> = records.iter().filter(|r| key.key(r) == name).collect();

    let mut acc = EntityAccumulator::new(name, own.first().map_or(Role::Unknown, |r| r.role));
    for record in &own {
        acc.absorb(record, key.counterpart(record));
    }
    if own.is_empty() {
        debug!("No records for {} {:?}, returning zeroed profile", key, name);
    }

    let entry = derive_rates_with(&acc, records.len(), options);
    let top_counterparts = top_counterparts(&entry);

    EntityProfile {
        trend: bucket_by(&own, iso_week_label),
        top_counterparts,
        entry,
    }
}

/// Counterparts with at least three shared matches, best win rate first.
///
/// Win rates are compared at three-decimal precision; equal rates prefer the
/// counterpart with more matches.
pub fn top_counterparts(entry: &RankingEntry) -> Vec<BreakdownRow> {
    let mut rows: Vec<BreakdownRow> = entry
        .counterparts
        .iter()
        .filter(|row| row.matches >= TOP_COUNTERPART_MIN_MATCHES)
        .cloned()
        .collect();

    let rate_key = |row: &BreakdownRow| (row.win_rate * 1000.0).round() as i64;
    rows.sort_by(|a, b| {
        rate_key(b)
            .cmp(&rate_key(a))
            .then_with(|| b.matches.cmp(&a.matches))
    });
    rows.truncate(TOP_COUNTERPART_LIMIT);
    rows
}
