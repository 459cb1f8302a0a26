//! Scored highlight candidates.
//!
//! Each candidate is one linear scan over the subject's records picking the
//! best match for a single field. Scores only order candidates against each
//! other; they are never shown.

use std::collections::HashSet;

use super::format::{format_compact, format_mm_ss};
use super::{EntityKind, HighlightError};
use crate::models::{Accent, Category, HighlightBlock, MatchRecord};

/// Matches shorter than this are ignored by length-sensitive candidates.
pub const MIN_GAME_SECONDS: u32 = 300;

/// Number of scored blocks that follow the fixed damage block.
pub const SCORED_SLOTS: usize = 2;

// Cross-category weights for lower-is-better cards. Raw values at or above
// the ceiling score 0 and sort after every positive score.
const PACIFIST_CEILING: f64 = 1000.0;
const SPEEDRUN_CEILING: f64 = 10_000.0;
const KDA_SCALE: f64 = 100.0;

/// Which end of a field a candidate is looking for.
///
/// The direction alone decides which record a candidate picks; the ceiling
/// only turns the picked value into a score comparable with other cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateOrder {
    HigherIsBetter,
    /// Score is `ceiling - raw`, saturating at 0. Finite and non-negative
    /// for any finite raw value.
    LowerIsBetter { ceiling: f64 },
}

impl CandidateOrder {
    pub fn score(&self, raw: f64) -> f64 {
        match self {
            CandidateOrder::HigherIsBetter => raw,
            CandidateOrder::LowerIsBetter { ceiling } => (ceiling - raw).max(0.0),
        }
    }

    /// Whether `candidate` strictly beats `current`.
    fn prefers(&self, candidate: f64, current: f64) -> bool {
        match self {
            CandidateOrder::HigherIsBetter => candidate > current,
            CandidateOrder::LowerIsBetter { .. } => candidate < current,
        }
    }
}

/// A block competing for one of the scored slots.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightCandidate {
    pub category: Category,
    pub score: f64,
    pub block: HighlightBlock,
}

/// Best record under `order`; the first record wins ties.
pub fn pick_best<'a, F>(
    rows: &[&'a MatchRecord],
    order: CandidateOrder,
    value: F,
) -> Option<(&'a MatchRecord, f64)>
where
    F: Fn(&MatchRecord) -> f64,
{
    let mut best: Option<(&'a MatchRecord, f64)> = None;
    for &row in rows {
        let v = value(row);
        match best {
            Some((_, current)) if !order.prefers(v, current) => {}
            _ => best = Some((row, v)),
        }
    }
    best
}

struct Card {
    id: &'static str,
    title: &'static str,
    accent: Accent,
    category: Category,
}

impl Card {
    fn build(
        &self,
        score: f64,
        main_value: String,
        sub_value: String,
        footer: String,
    ) -> Result<HighlightCandidate, HighlightError> {
        if !score.is_finite() {
            return Err(HighlightError::NonFiniteScore {
                block: self.id,
                value: score,
            });
        }

        Ok(HighlightCandidate {
            category: self.category,
            score,
            block: HighlightBlock {
                id: self.id.to_string(),
                title: self.title.to_string(),
                accent: self.accent,
                main_value,
                sub_value,
                footer,
                category: Some(self.category),
                flavor: None,
            },
        })
    }
}

fn or_default(text: String, default: &str) -> String {
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

/// `Map with Counterpart`, either part optional.
fn place_with(row: &MatchRecord, kind: EntityKind) -> String {
    let counterpart = kind.counterpart(row);
    match (row.map.is_empty(), counterpart.is_empty()) {
        (false, false) => format!("{} with {}", row.map, counterpart),
        (false, true) => row.map.clone(),
        (true, false) => counterpart.to_string(),
        (true, true) => String::new(),
    }
}

/// `Won 🏆 • Map` or `Lost • Map`.
fn outcome_on(row: &MatchRecord) -> String {
    let outcome = if row.winner { "Won 🏆" } else { "Lost" };
    if row.map.is_empty() {
        outcome.to_string()
    } else {
        format!("{} • {}", outcome, row.map)
    }
}

/// The fixed first block: the subject's single most damaging match.
pub fn most_violent(rows: &[&MatchRecord], kind: EntityKind) -> Result<HighlightBlock, HighlightError> {
    let Some(&first) = rows.first() else {
        return Err(HighlightError::BlockCount(0));
    };

    let mut best = first;
    for &row in rows {
        if row.total_damage() > best.total_damage() {
            best = row;
        }
    }

    let total = best.total_damage();
    if !total.is_finite() {
        return Err(HighlightError::NonFiniteScore {
            block: "most_violent",
            value: total,
        });
    }

    let counterpart = kind.counterpart(best);
    let mut footer = String::new();
    if !counterpart.is_empty() {
        footer.push_str(counterpart);
    }
    if !best.map.is_empty() {
        if !footer.is_empty() {
            footer.push_str(" on ");
        }
        footer.push_str(&best.map);
    }
    if best.winner {
        footer.push_str(" 🏆");
    }

    Ok(HighlightBlock {
        id: "most_violent".to_string(),
        title: "🔥 Most Violent Match".to_string(),
        accent: Accent::Red,
        main_value: format!("{} total damage", format_compact(total)),
        sub_value: format!(
            "{} hero + {} siege",
            format_compact(best.hero_damage),
            format_compact(best.siege_damage)
        ),
        footer: or_default(footer.trim_start().to_string(), "An epic match"),
        category: Some(Category::Damage),
        flavor: None,
    })
}

fn most_time_dead(rows: &[&MatchRecord], kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let order = CandidateOrder::HigherIsBetter;
    let Some((row, secs)) = pick_best(rows, order, |r| r.spent_dead_seconds as f64) else {
        return Ok(None);
    };
    if secs <= 0.0 {
        return Ok(None);
    }

    let card = Card {
        id: "most_time_dead",
        title: "🪦 Day of the Dead",
        accent: Accent::Purple,
        category: Category::TimeDead,
    };
    card.build(
        order.score(secs),
        format_mm_ss(secs),
        "time dead".to_string(),
        or_default(place_with(row, kind), "In some match"),
    )
    .map(Some)
}

fn most_healing(rows: &[&MatchRecord], kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    if !rows.iter().any(|r| r.healing_shielding > 0.0) {
        return Ok(None);
    }

    let order = CandidateOrder::HigherIsBetter;
    let Some((row, healing)) = pick_best(rows, order, |r| r.healing_shielding) else {
        return Ok(None);
    };

    let card = Card {
        id: "most_healing",
        title: "👼 Guardian Angel",
        accent: Accent::Teal,
        category: Category::Healing,
    };
    card.build(
        order.score(healing),
        format_compact(healing),
        "healing and shields".to_string(),
        or_default(place_with(row, kind), "In some match"),
    )
    .map(Some)
}

fn most_deaths(rows: &[&MatchRecord], _kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let order = CandidateOrder::HigherIsBetter;
    let Some((row, deaths)) = pick_best(rows, order, |r| r.deaths as f64) else {
        return Ok(None);
    };
    if deaths <= 0.0 {
        return Ok(None);
    }

    let kda = row.kda();
    let mut sub_value = format!("{} deaths", row.deaths);
    if kda > 0.0 {
        sub_value.push_str(&format!(" • KDA: {:.2}", kda));
    }

    let card = Card {
        id: "most_deaths",
        title: "😵 Kamikaze",
        accent: Accent::Red,
        category: Category::Deaths,
    };
    card.build(
        order.score(deaths),
        format!("{} deaths", row.deaths),
        sub_value,
        outcome_on(row),
    )
    .map(Some)
}

fn pacifist_win(rows: &[&MatchRecord], kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let wins: Vec<&MatchRecord> = rows.iter().copied().filter(|r| r.winner).collect();

    let order = CandidateOrder::LowerIsBetter {
        ceiling: PACIFIST_CEILING,
    };
    let Some((row, kills)) = pick_best(&wins, order, |r| r.kills as f64) else {
        return Ok(None);
    };

    let main_value = if row.kills == 0 {
        "0 kills and still won".to_string()
    } else {
        format!("{} kills and won", row.kills)
    };
    let sub_value = if row.takedowns > 0 {
        format!("{} takedowns", row.takedowns)
    } else if row.assists > 0 {
        format!("{} assists", row.assists)
    } else {
        "0 kills, 0 assists".to_string()
    };

    let card = Card {
        id: "pacifist_win",
        title: "🧠 Pacifist with Results",
        accent: Accent::Amber,
        category: Category::Pacifist,
    };
    card.build(
        order.score(kills),
        main_value,
        sub_value,
        format!("{} 🏆", place_with(row, kind)).trim_start().to_string(),
    )
    .map(Some)
}

fn speedrun(rows: &[&MatchRecord], _kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let long_enough: Vec<&MatchRecord> = rows
        .iter()
        .copied()
        .filter(|r| r.game_time_seconds >= MIN_GAME_SECONDS)
        .collect();

    let order = CandidateOrder::LowerIsBetter {
        ceiling: SPEEDRUN_CEILING,
    };
    let Some((row, secs)) = pick_best(&long_enough, order, |r| r.game_time_seconds as f64) else {
        return Ok(None);
    };

    let card = Card {
        id: "speedrun",
        title: "⚡ Speedrun",
        accent: Accent::Amber,
        category: Category::Speedrun,
    };
    card.build(
        order.score(secs),
        format_mm_ss(secs),
        "match length".to_string(),
        outcome_on(row),
    )
    .map(Some)
}

fn raid_boss(rows: &[&MatchRecord], _kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let order = CandidateOrder::HigherIsBetter;
    let Some((row, taken)) = pick_best(rows, order, |r| r.damage_taken) else {
        return Ok(None);
    };
    if taken <= 0.0 {
        return Ok(None);
    }

    let card = Card {
        id: "raid_boss",
        title: "🧱 Raid Boss",
        accent: Accent::Red,
        category: Category::DamageTaken,
    };
    card.build(
        order.score(taken),
        format_compact(taken),
        "damage taken".to_string(),
        outcome_on(row),
    )
    .map(Some)
}

fn protagonist(rows: &[&MatchRecord], kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let long_enough: Vec<&MatchRecord> = rows
        .iter()
        .copied()
        .filter(|r| r.game_time_seconds >= MIN_GAME_SECONDS)
        .collect();

    let order = CandidateOrder::HigherIsBetter;
    let Some((row, kda)) = pick_best(&long_enough, order, MatchRecord::kda) else {
        return Ok(None);
    };

    let card = Card {
        id: "protagonist",
        title: "🔥 Protagonist Mode",
        accent: Accent::Amber,
        category: Category::Kda,
    };
    card.build(
        order.score(kda * KDA_SCALE),
        format!("KDA {:.2}", kda),
        format!("{}K / {}A / {}D", row.kills, row.assists, row.deaths),
        or_default(place_with(row, kind), "An epic match"),
    )
    .map(Some)
}

fn push_enjoyer(rows: &[&MatchRecord], kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let order = CandidateOrder::HigherIsBetter;
    let Some((row, siege)) = pick_best(rows, order, |r| r.siege_damage) else {
        return Ok(None);
    };
    if siege <= 0.0 {
        return Ok(None);
    }

    let card = Card {
        id: "push_enjoyer",
        title: "🎯 Objectives > Ego",
        accent: Accent::Teal,
        category: Category::Siege,
    };
    card.build(
        order.score(siege),
        format_compact(siege),
        "structure damage".to_string(),
        or_default(place_with(row, kind), "In some match"),
    )
    .map(Some)
}

fn socializer(rows: &[&MatchRecord], kind: EntityKind) -> Result<Option<HighlightCandidate>, HighlightError> {
    let order = CandidateOrder::HigherIsBetter;
    let Some((row, assists)) = pick_best(rows, order, |r| r.assists as f64) else {
        return Ok(None);
    };
    if assists <= 0.0 {
        return Ok(None);
    }

    let mut sub_value = format!("{} assists", row.assists);
    if row.takedowns > 0 {
        sub_value.push_str(&format!(" • {} takedowns", row.takedowns));
    }

    let card = Card {
        id: "socializer",
        title: "🤝 Socializer",
        accent: Accent::Teal,
        category: Category::Assists,
    };
    card.build(
        order.score(assists),
        format!("{} assists", row.assists),
        sub_value,
        or_default(place_with(row, kind), "In some match"),
    )
    .map(Some)
}

type CandidateFn = fn(&[&MatchRecord], EntityKind) -> Result<Option<HighlightCandidate>, HighlightError>;

const CANDIDATES: [CandidateFn; 9] = [
    most_time_dead,
    most_healing,
    most_deaths,
    pacifist_win,
    speedrun,
    raid_boss,
    protagonist,
    push_enjoyer,
    socializer,
];

/// Every candidate whose inclusion guard passes, in generation order.
pub fn generate_candidates(
    rows: &[&MatchRecord],
    kind: EntityKind,
) -> Result<Vec<HighlightCandidate>, HighlightError> {
    let mut candidates = Vec::with_capacity(CANDIDATES.len());
    for build in CANDIDATES {
        if let Some(candidate) = build(rows, kind)? {
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

/// Highest scores first, at most `limit`, never repeating a category.
///
/// `Damage` counts as used from the start. Equal scores keep generation order.
pub fn select_candidates(mut candidates: Vec<HighlightCandidate>, limit: usize) -> Vec<HighlightCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut used = HashSet::from([Category::Damage]);
    let mut picked = Vec::with_capacity(limit);
    for candidate in candidates {
        if picked.len() >= limit {
            break;
        }
        if used.insert(candidate.category) {
            picked.push(candidate);
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::GroupKey;

    fn ids(candidates: &[HighlightCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.block.id.as_str()).collect()
    }

    #[test]
    fn test_order_scores_saturate() {
        let lower = CandidateOrder::LowerIsBetter { ceiling: 1000.0 };
        assert_eq!(lower.score(3.0), 997.0);
        assert_eq!(lower.score(5000.0), 0.0);
        assert_eq!(CandidateOrder::HigherIsBetter.score(42.0), 42.0);
    }

    #[test]
    fn test_values_past_ceiling_still_pick_and_sort_last() {
        let marathon = MatchRecord::new("Ana", "Valla")
            .with_win(true)
            .with_kda(5000, 0, 0)
            .with_game_time(20_000);
        let longer = MatchRecord::new("Bo", "Valla")
            .with_win(true)
            .with_kda(3000, 0, 0)
            .with_game_time(30_000);
        let rows = vec![&marathon, &longer];

        let candidates = generate_candidates(&rows, GroupKey::Hero).unwrap();
        assert_eq!(ids(&candidates), vec!["pacifist_win", "speedrun", "protagonist"]);

        let pacifist = &candidates[0];
        assert_eq!(pacifist.score, 0.0);
        assert_eq!(pacifist.block.main_value, "3000 kills and won");

        let speed = &candidates[1];
        assert_eq!(speed.score, 0.0);
        assert_eq!(speed.block.main_value, "333:20");

        let picked = select_candidates(candidates, SCORED_SLOTS);
        assert_eq!(ids(&picked), vec!["protagonist", "pacifist_win"]);
        assert_eq!(picked[0].score, 500_000.0);
    }

    #[test]
    fn test_pick_best_first_seen_wins_ties() {
        let a = MatchRecord::new("A", "h").with_kda(3, 0, 0);
        let b = MatchRecord::new("B", "h").with_kda(3, 0, 0);
        let c = MatchRecord::new("C", "h").with_kda(1, 0, 0);
        let rows = vec![&a, &b, &c];

        let (best, _) = pick_best(&rows, CandidateOrder::HigherIsBetter, |r| r.kills as f64).unwrap();
        assert_eq!(best.player_name, "A");

        let lower = CandidateOrder::LowerIsBetter { ceiling: 10.0 };
        let (best, kills) = pick_best(&rows, lower, |r| r.kills as f64).unwrap();
        assert_eq!(best.player_name, "C");
        assert_eq!(kills, 1.0);

        assert!(pick_best(&[], lower, |r| r.kills as f64).is_none());
    }

    #[test]
    fn test_most_violent_footer_and_values() {
        let quiet = MatchRecord::new("Ana", "Valla").with_damage(10_000.0, 0.0);
        let loud = MatchRecord::new("Bo", "Valla")
            .with_map("Cursed Hollow")
            .with_win(true)
            .with_damage(100_000.0, 20_000.0);
        let rows = vec![&quiet, &loud];

        let block = most_violent(&rows, GroupKey::Hero).unwrap();
        assert_eq!(block.main_value, "120.0K total damage");
        assert_eq!(block.sub_value, "100.0K hero + 20.0K siege");
        assert_eq!(block.footer, "Bo on Cursed Hollow 🏆");

        let block = most_violent(&rows, GroupKey::Player).unwrap();
        assert_eq!(block.footer, "Valla on Cursed Hollow 🏆");
    }

    #[test]
    fn test_most_violent_all_zero_keeps_first() {
        let a = MatchRecord::new("Ana", "Valla");
        let b = MatchRecord::new("Bo", "Valla");
        let block = most_violent(&[&a, &b], GroupKey::Hero).unwrap();
        assert_eq!(block.footer, "Ana");
        assert_eq!(block.main_value, "0 total damage");
    }

    #[test]
    fn test_guards_skip_zero_fields() {
        let row = MatchRecord::new("Ana", "Valla");
        let candidates = generate_candidates(&[&row], GroupKey::Hero).unwrap();
        // Nothing is non-zero, no win and no long match.
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_length_floor_and_pacifist() {
        let short = MatchRecord::new("Ana", "Valla").with_game_time(120).with_kda(20, 0, 0);
        let long = MatchRecord::new("Bo", "Valla")
            .with_game_time(900)
            .with_win(true)
            .with_kda(2, 1, 3);
        let rows = vec![&short, &long];

        let candidates = generate_candidates(&rows, GroupKey::Hero).unwrap();
        let speed = candidates.iter().find(|c| c.category == Category::Speedrun).unwrap();
        assert_eq!(speed.block.main_value, "15:00");
        assert_eq!(speed.score, 9100.0);

        let kda = candidates.iter().find(|c| c.category == Category::Kda).unwrap();
        assert_eq!(kda.block.main_value, "KDA 5.00");
        assert_eq!(kda.block.sub_value, "2K / 3A / 1D");

        let pacifist = candidates.iter().find(|c| c.category == Category::Pacifist).unwrap();
        assert_eq!(pacifist.block.main_value, "2 kills and won");
        assert_eq!(pacifist.score, 998.0);
        assert_eq!(pacifist.block.sub_value, "3 assists");
    }

    #[test]
    fn test_most_deaths_sub_value() {
        let row = MatchRecord::new("Ana", "Valla").with_map("Hanamura").with_kda(2, 8, 2);
        let candidates = generate_candidates(&[&row], GroupKey::Hero).unwrap();
        let deaths = candidates.iter().find(|c| c.category == Category::Deaths).unwrap();
        assert_eq!(deaths.block.main_value, "8 deaths");
        assert_eq!(deaths.block.sub_value, "8 deaths • KDA: 0.50");
        assert_eq!(deaths.block.footer, "Lost • Hanamura");
    }

    #[test]
    fn test_select_skips_used_categories_and_limits() {
        let make = |id: &'static str, category, score| HighlightCandidate {
            category,
            score,
            block: HighlightBlock {
                id: id.to_string(),
                title: String::new(),
                accent: Accent::Slate,
                main_value: String::new(),
                sub_value: String::new(),
                footer: String::new(),
                category: Some(category),
                flavor: None,
            },
        };

        let picked = select_candidates(
            vec![
                make("low", Category::Assists, 1.0),
                make("damage", Category::Damage, 1e9),
                make("tie_a", Category::Siege, 50.0),
                make("dup", Category::Siege, 60.0),
                make("tie_b", Category::Healing, 50.0),
            ],
            SCORED_SLOTS,
        );
        assert_eq!(ids(&picked), vec!["dup", "tie_b"]);
    }

    #[test]
    fn test_non_finite_score_is_an_error() {
        let card = Card {
            id: "raid_boss",
            title: "",
            accent: Accent::Red,
            category: Category::DamageTaken,
        };
        let err = card
            .build(f64::INFINITY, String::new(), String::new(), String::new())
            .unwrap_err();
        assert!(matches!(err, HighlightError::NonFiniteScore { block: "raid_boss", .. }));
    }
}
