//! Year-over-year comparison.
//!
//! Records are partitioned by calendar year and every year is aggregated on
//! its own. Undated records never land in a year.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculate::{aggregate, overview, safe_divide, GroupKey, OverviewMetrics, RateOptions};
use crate::models::{ChangeMetric, Changes, ComparisonEntry, Delta, MatchRecord, Role, YearAggregate};

/// Baseline-year matches an entity needs to appear in a change leaderboard.
pub const DEFAULT_ACTIVITY_FLOOR: u32 = 5;

/// Distinct years present in the records, newest first.
pub fn available_years(records: &[MatchRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().filter_map(|r| r.year()).collect();
    years.into_iter().rev().collect()
}

/// Records dated in `year`.
pub fn filter_by_year(records: &[MatchRecord], year: i32) -> Vec<MatchRecord> {
    records
        .iter()
        .filter(|r| r.year() == Some(year))
        .cloned()
        .collect()
}

/// Overview figures for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearMetrics {
    pub year: i32,
    #[serde(flatten)]
    pub metrics: OverviewMetrics,
}

/// Overview of one year; all zero when the year has no records.
pub fn year_metrics(records: &[MatchRecord], year: i32) -> YearMetrics {
    YearMetrics {
        year,
        metrics: overview(&filter_by_year(records, year)),
    }
}

/// [`year_metrics`] for each requested year, in request order.
pub fn multi_year_metrics(records: &[MatchRecord], years: &[i32]) -> Vec<YearMetrics> {
    years.iter().map(|&year| year_metrics(records, year)).collect()
}

/// Delta from `first` to `last`.
pub fn calculate_difference(first: f64, last: f64) -> Delta {
    Delta::between(first, last)
}

/// Compare every hero or player across the requested years.
///
/// Duplicate years are ignored. Every entity seen in any requested year gets
/// an aggregate for every requested year (zeroed when absent), and `changes`
/// between the earliest and latest year when at least two years are given.
/// Entities are listed in first-seen order, scanning years oldest first.
pub fn compare_across_years(
    records: &[MatchRecord],
    years: &[i32],
    key: GroupKey,
    options: &RateOptions,
) -> Vec<ComparisonEntry> {
    let years: Vec<i32> = years.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

    let mut order: Vec<(String, Role)> = Vec::new();
    let mut per_year: HashMap<String, BTreeMap<i32, YearAggregate>> = HashMap::new();

    for &year in &years {
        let year_records = filter_by_year(records, year);
        debug!("Year {} has {} records", year, year_records.len());

        for entry in aggregate(&year_records, key).derive(options) {
            let slot = per_year.entry(entry.name.clone()).or_insert_with(|| {
                order.push((entry.name.clone(), entry.role));
                BTreeMap::new()
            });
            slot.insert(year, YearAggregate::from(&entry));
        }
    }

    order
        .into_iter()
        .map(|(name, role)| {
            let mut by_year = per_year.remove(&name).unwrap_or_default();
            for &year in &years {
                by_year.entry(year).or_default();
            }

            let changes = if years.len() >= 2 {
                match (by_year.values().next(), by_year.values().next_back()) {
                    (Some(first), Some(last)) => Some(Changes::between(first, last)),
                    _ => None,
                }
            } else {
                None
            };

            ComparisonEntry {
                name,
                role,
                years: by_year,
                changes,
            }
        })
        .collect()
}

/// Which side of a change leaderboard to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    /// Positive deltas, largest first
    Improvements,
    /// Negative deltas, most negative first
    Regressions,
}

/// One row of a change leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopChange {
    pub name: String,
    pub role: Role,
    pub baseline_matches: u32,
    pub first: f64,
    pub last: f64,
    pub delta: Delta,
}

/// Entities whose `metric` moved most between the earliest and latest year.
///
/// Only entities with at least `activity_floor` matches in the earliest year
/// qualify. Equal deltas keep input order.
pub fn top_changes(
    entries: &[ComparisonEntry],
    metric: ChangeMetric,
    limit: usize,
    direction: ChangeDirection,
    activity_floor: u32,
) -> Vec<TopChange> {
    let mut rows: Vec<TopChange> = entries
        .iter()
        .filter_map(|entry| {
            let changes = entry.changes.as_ref()?;
            let first = entry.baseline()?;
            let last = entry.latest()?;
            if first.matches < activity_floor {
                return None;
            }

            let delta = *changes.get(metric);
            let keep = match direction {
                ChangeDirection::Improvements => delta.absolute > 0.0,
                ChangeDirection::Regressions => delta.absolute < 0.0,
            };
            keep.then(|| TopChange {
                name: entry.name.clone(),
                role: entry.role,
                baseline_matches: first.matches,
                first: metric.value(first),
                last: metric.value(last),
                delta,
            })
        })
        .collect();

    match direction {
        ChangeDirection::Improvements => {
            rows.sort_by(|a, b| b.delta.absolute.total_cmp(&a.delta.absolute))
        }
        ChangeDirection::Regressions => {
            rows.sort_by(|a, b| a.delta.absolute.total_cmp(&b.delta.absolute))
        }
    }
    rows.truncate(limit);
    rows
}

/// Scalar tracked month by month in an evolution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionMetric {
    WinRate,
    TotalMatches,
    AvgGameTimeSeconds,
    AvgTakedowns,
}

impl EvolutionMetric {
    fn compute(&self, rows: &[&MatchRecord]) -> f64 {
        let n = rows.len() as f64;
        match self {
            EvolutionMetric::WinRate => {
                safe_divide(rows.iter().filter(|r| r.winner).count() as f64, n)
            }
            EvolutionMetric::TotalMatches => n,
            EvolutionMetric::AvgGameTimeSeconds => safe_divide(
                rows.iter().map(|r| r.game_time_seconds as f64).sum(),
                n,
            ),
            EvolutionMetric::AvgTakedowns => {
                safe_divide(rows.iter().map(|r| r.takedowns as f64).sum(), n)
            }
        }
    }
}

impl std::str::FromStr for EvolutionMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "win_rate" => Ok(EvolutionMetric::WinRate),
            "total_matches" | "matches" => Ok(EvolutionMetric::TotalMatches),
            "avg_game_time_seconds" | "avg_game_time" => Ok(EvolutionMetric::AvgGameTimeSeconds),
            "avg_takedowns" => Ok(EvolutionMetric::AvgTakedowns),
            _ => Err(format!("unknown evolution metric: {}", s)),
        }
    }
}

/// One month of an evolution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionPoint {
    /// Two-digit month, `01` to `12`
    pub month: String,
    /// `None` where the year has no records that month
    pub values: BTreeMap<i32, Option<f64>>,
}

/// Month-of-year series with one value per requested year.
///
/// Only months with records in at least one requested year are listed.
pub fn evolution_data(
    records: &[MatchRecord],
    years: &[i32],
    metric: EvolutionMetric,
) -> Vec<EvolutionPoint> {
    let mut buckets: BTreeMap<u32, HashMap<i32, Vec<&MatchRecord>>> = BTreeMap::new();
    for record in records {
        let Some(date) = record.date else { continue };
        if !years.contains(&date.year()) {
            continue;
        }
        buckets
            .entry(date.month())
            .or_default()
            .entry(date.year())
            .or_default()
            .push(record);
    }

    buckets
        .into_iter()
        .map(|(month, by_year)| EvolutionPoint {
            month: format!("{:02}", month),
            values: years
                .iter()
                .map(|year| {
                    let value = by_year
                        .get(year)
                        .filter(|rows| !rows.is_empty())
                        .map(|rows| metric.compute(rows));
                    (*year, value)
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn on(player: &str, hero: &str, y: i32, m: u32, win: bool) -> MatchRecord {
        MatchRecord::new(player, hero)
            .with_win(win)
            .with_date(NaiveDate::from_ymd_opt(y, m, 15).unwrap())
    }

    fn repeat(n: usize, record: MatchRecord) -> Vec<MatchRecord> {
        std::iter::repeat(record).take(n).collect()
    }

    #[test]
    fn test_available_years_desc() {
        let records = vec![
            on("a", "h", 2023, 1, true),
            on("a", "h", 2025, 1, true),
            MatchRecord::new("a", "h"),
            on("a", "h", 2024, 1, true),
            on("a", "h", 2025, 6, true),
        ];
        assert_eq!(available_years(&records), vec![2025, 2024, 2023]);
        assert_eq!(filter_by_year(&records, 2025).len(), 2);
    }

    #[test]
    fn test_year_metrics_zeroed_when_empty() {
        let records = vec![on("a", "h", 2024, 3, true), on("a", "h", 2024, 4, false)];
        let metrics = multi_year_metrics(&records, &[2024, 2030]);
        assert_eq!(metrics[0].metrics.total_matches, 2);
        assert_eq!(metrics[0].metrics.win_rate, 0.5);
        assert_eq!(metrics[1].year, 2030);
        assert_eq!(metrics[1].metrics, OverviewMetrics::default());
    }

    #[test]
    fn test_compare_zero_fills_and_deltas() {
        let mut records = repeat(4, on("Ana", "Valla", 2024, 2, true));
        records.extend(repeat(4, on("Ana", "Valla", 2024, 2, false)));
        records.extend(repeat(2, on("Ana", "Valla", 2025, 2, true)));
        records.push(on("Bo", "Muradin", 2025, 5, true));
        records.push(MatchRecord::new("Cy", "Zeratul"));

        let entries = compare_across_years(&records, &[2025, 2024, 2025], GroupKey::Hero, &RateOptions::default());
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Valla", "Muradin"]);

        let valla = &entries[0];
        assert_eq!(valla.years.keys().copied().collect::<Vec<_>>(), vec![2024, 2025]);
        assert_eq!(valla.years[&2024].matches, 8);
        assert_eq!(valla.years[&2025].win_rate, 1.0);
        let changes = valla.changes.unwrap();
        assert_eq!(changes.matches.absolute, -6.0);
        assert_eq!(changes.win_rate.direction, Direction::Up);
        assert!((changes.win_rate.percentage - 100.0).abs() < 1e-9);

        let muradin = &entries[1];
        assert_eq!(muradin.years[&2024], YearAggregate::default());
        assert_eq!(muradin.years[&2025].matches, 1);
        assert_eq!(muradin.changes.unwrap().matches.percentage, 100.0);
    }

    #[test]
    fn test_single_year_has_no_changes() {
        let records = vec![on("Ana", "Valla", 2024, 2, true)];
        let entries = compare_across_years(&records, &[2024, 2024], GroupKey::Player, &RateOptions::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Ana");
        assert!(entries[0].changes.is_none());
    }

    fn comparison() -> Vec<ComparisonEntry> {
        let mut records = Vec::new();
        // Steady: 10 matches both years, win rate 0.3 -> 0.7
        records.extend(repeat(3, on("p", "Steady", 2024, 1, true)));
        records.extend(repeat(7, on("p", "Steady", 2024, 1, false)));
        records.extend(repeat(7, on("p", "Steady", 2025, 1, true)));
        records.extend(repeat(3, on("p", "Steady", 2025, 1, false)));
        // Fading: 6 matches, win rate 1.0 -> 0.0
        records.extend(repeat(6, on("p", "Fading", 2024, 1, true)));
        records.extend(repeat(2, on("p", "Fading", 2025, 1, false)));
        // Newcomer: absent in 2024, perfect in 2025
        records.extend(repeat(20, on("p", "Newcomer", 2025, 1, true)));
        // Rare: 2 matches in 2024 only, big swing
        records.extend(repeat(2, on("p", "Rare", 2024, 1, false)));
        records.extend(repeat(9, on("p", "Rare", 2025, 1, true)));

        compare_across_years(&records, &[2024, 2025], GroupKey::Hero, &RateOptions::default())
    }

    #[test]
    fn test_top_changes_activity_floor() {
        let entries = comparison();
        let improvements = top_changes(&entries, ChangeMetric::WinRate, 10, ChangeDirection::Improvements, DEFAULT_ACTIVITY_FLOOR);
        let names: Vec<_> = improvements.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Steady"]);
        assert!(improvements.iter().all(|c| c.baseline_matches >= DEFAULT_ACTIVITY_FLOOR));
        assert!((improvements[0].delta.absolute - 0.4).abs() < 1e-9);

        let matches = top_changes(&entries, ChangeMetric::Matches, 10, ChangeDirection::Improvements, DEFAULT_ACTIVITY_FLOOR);
        assert!(matches.iter().all(|c| c.name != "Newcomer"));
    }

    #[test]
    fn test_top_changes_regressions_most_negative_first() {
        let entries = comparison();
        let regressions = top_changes(&entries, ChangeMetric::Matches, 10, ChangeDirection::Regressions, DEFAULT_ACTIVITY_FLOOR);
        let names: Vec<_> = regressions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Fading"]);
        assert_eq!(regressions[0].first, 6.0);
        assert_eq!(regressions[0].last, 2.0);

        let regressions = top_changes(&entries, ChangeMetric::WinRate, 10, ChangeDirection::Regressions, 0);
        let names: Vec<_> = regressions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Fading"]);

        let all = top_changes(&entries, ChangeMetric::WinRate, 1, ChangeDirection::Improvements, 0);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Rare");
    }

    #[test]
    fn test_calculate_difference() {
        let delta = calculate_difference(4.0, 5.0);
        assert_eq!(delta.absolute, 1.0);
        assert_eq!(delta.percentage, 25.0);
        assert_eq!(delta.direction, Direction::Up);
    }

    #[test]
    fn test_evolution_data() {
        let records = vec![
            on("a", "h", 2024, 3, true),
            on("a", "h", 2024, 3, false),
            on("a", "h", 2025, 3, true),
            on("a", "h", 2025, 11, true),
            on("a", "h", 2023, 7, true),
            MatchRecord::new("a", "h"),
        ];

        let series = evolution_data(&records, &[2024, 2025], EvolutionMetric::WinRate);
        let months: Vec<_> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["03", "11"]);
        assert_eq!(series[0].values[&2024], Some(0.5));
        assert_eq!(series[0].values[&2025], Some(1.0));
        assert_eq!(series[1].values[&2024], None);

        let counts = evolution_data(&records, &[2024], EvolutionMetric::TotalMatches);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].values[&2024], Some(2.0));
    }

    #[test]
    fn test_evolution_metric_parse() {
        assert_eq!("win_rate".parse::<EvolutionMetric>().unwrap(), EvolutionMetric::WinRate);
        assert_eq!("avg-takedowns".parse::<EvolutionMetric>().unwrap(), EvolutionMetric::AvgTakedowns);
        assert!("dpm".parse::<EvolutionMetric>().is_err());
    }
}
