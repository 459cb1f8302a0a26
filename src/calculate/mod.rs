//! Statistics calculation engine.
//!
//! Computes derived metrics from normalized match records:
//! - Per-hero / per-player accumulators
//! - Win rates, Wilson-adjusted win rates, KDA and per-minute stats
//! - Metric leaderboards with a minimum-sample floor
//! - Dataset overview and over-time series

mod aggregate;
mod overview;
mod rank;

pub use aggregate::*;
pub use overview::*;
pub use rank::*;

use serde::{Deserialize, Serialize};

use crate::models::{
    is_low_sample, BreakdownRow, ConfidenceLabel, EntityAccumulator, RankingEntry,
    DEFAULT_LOW_SAMPLE_THRESHOLD,
};

/// z-score for a ~95% confidence interval.
pub const DEFAULT_WILSON_Z: f64 = 1.96;

/// Tunables for deriving rates from an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateOptions {
    /// `low_sample` is set below this many matches
    pub low_sample_threshold: u32,
    /// z-score used by the Wilson lower bound
    pub wilson_z: f64,
}

impl Default for RateOptions {
    fn default() -> Self {
        Self {
            low_sample_threshold: DEFAULT_LOW_SAMPLE_THRESHOLD,
            wilson_z: DEFAULT_WILSON_Z,
        }
    }
}

/// Divide, returning 0 for a zero denominator or a non-finite result.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let result = numerator / denominator;
    if result.is_finite() {
        result
    } else {
        0.0
    }
}

/// Calculate win rate from wins and matches.
pub fn calculate_win_rate(wins: u32, matches: u32) -> f64 {
    safe_divide(wins as f64, matches as f64)
}

/// `(kills + assists) / max(1, deaths)`.
pub fn calculate_kda(kills: u64, deaths: u64, assists: u64) -> f64 {
    (kills + assists) as f64 / deaths.max(1) as f64
}

/// Lower bound of the Wilson score interval for a win probability.
///
/// Never exceeds the raw rate `wins / n` and converges to it as `n` grows.
pub fn wilson_lower_bound(wins: u32, n: u32, z: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }

    let n = n as f64;
    let phat = wins as f64 / n;
    let zsq = z * z;

    let numerator = phat + zsq / (2.0 * n) - z * ((phat * (1.0 - phat) + zsq / (4.0 * n)) / n).sqrt();
    let denominator = 1.0 + zsq / n;

    (numerator / denominator).max(0.0)
}

/// Derive every rate for an accumulator using default options.
pub fn derive_rates(acc: &EntityAccumulator, total_records: usize) -> RankingEntry {
    derive_rates_with(acc, total_records, &RateOptions::default())
}

/// Derive every rate for an accumulator.
///
/// `total_records` is the size of the record set the accumulator was built
/// from and only feeds the pick rate.
pub fn derive_rates_with(
    acc: &EntityAccumulator,
    total_records: usize,
    options: &RateOptions,
) -> RankingEntry {
    let matches = acc.matches as f64;
    let avg = |sum: f64| safe_divide(sum, matches);

    let avg_kills = avg(acc.kills as f64);
    let avg_deaths = avg(acc.deaths as f64);
    let avg_hero_damage = avg(acc.hero_damage);
    let avg_siege_damage = avg(acc.siege_damage);
    let avg_total_damage = avg_hero_damage + avg_siege_damage;
    let avg_healing_shielding = avg(acc.healing_shielding);
    let avg_game_time_seconds = avg(acc.game_time_seconds as f64);
    let avg_minutes = avg_game_time_seconds / 60.0;
    let per_minute = |average: f64| safe_divide(average, avg_minutes);

    RankingEntry {
        name: acc.name.clone(),
        role: acc.role,
        matches: acc.matches,
        wins: acc.wins,
        losses: acc.losses(),
        win_rate: calculate_win_rate(acc.wins, acc.matches),
        win_rate_wilson: wilson_lower_bound(acc.wins, acc.matches, options.wilson_z),
        pick_rate: safe_divide(matches, total_records as f64),
        kills: acc.kills,
        deaths: acc.deaths,
        assists: acc.assists,
        takedowns: acc.takedowns,
        kda: calculate_kda(acc.kills, acc.deaths, acc.assists),
        avg_kills,
        avg_deaths,
        avg_assists: avg(acc.assists as f64),
        avg_takedowns: avg(acc.takedowns as f64),
        hero_damage: acc.hero_damage,
        siege_damage: acc.siege_damage,
        avg_hero_damage,
        avg_siege_damage,
        avg_total_damage,
        avg_damage_taken: avg(acc.damage_taken),
        avg_healing_shielding,
        avg_self_healing: avg(acc.self_healing),
        avg_experience: avg(acc.experience),
        avg_spent_dead_seconds: avg(acc.spent_dead_seconds as f64),
        avg_game_time_seconds,
        avg_on_fire_seconds: avg(acc.on_fire_seconds as f64),
        dpm: per_minute(avg_total_damage),
        hero_dpm: per_minute(avg_hero_damage),
        kills_per_min: per_minute(avg_kills),
        deaths_per_min: per_minute(avg_deaths),
        healing_per_min: per_minute(avg_healing_shielding),
        max_hero_damage: acc.max_hero_damage,
        max_total_damage: acc.max_total_damage,
        max_damage_taken: acc.max_damage_taken,
        max_healing_shielding: acc.max_healing_shielding,
        most_violent: acc.most_violent.clone(),
        low_sample: is_low_sample(acc.matches, options.low_sample_threshold),
        confidence: ConfidenceLabel::from_matches(acc.matches),
        maps: BreakdownRow::from_map(&acc.maps),
        counterparts: BreakdownRow::from_map(&acc.counterparts),
    }
}
