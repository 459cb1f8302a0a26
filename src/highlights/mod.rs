//! Highlight selection.
//!
//! Produces exactly three narrative cards for one hero or player:
//! 1. The most violent match (fixed, always the `damage` category)
//! 2. and 3. The two best-scoring candidates from distinct categories
//!
//! Sparse data is padded with generic cards. Any failure while scoring is
//! logged and replaced by a fallback triple, so callers always get three
//! blocks.

mod candidates;
mod flavor;
mod format;

pub use candidates::*;
pub use flavor::*;
pub use format::*;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::calculate::{safe_divide, GroupKey};
use crate::models::{Accent, HighlightBlock, MatchRecord};

/// Whether highlights describe a hero or a player.
pub type EntityKind = GroupKey;

/// Failure inside highlight scoring. Never escapes [`select_highlights`].
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("non-finite value {value} while scoring {block}")]
    NonFiniteScore { block: &'static str, value: f64 },

    #[error("assembled {0} highlight blocks instead of 3")]
    BlockCount(usize),
}

/// Why a fallback triple was returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The record set was empty
    NoData,
    /// No entity name was given
    NoEntity,
    /// The entity has no records, or scoring failed
    NoMatches,
}

impl FallbackReason {
    fn family(&self) -> &'static str {
        match self {
            FallbackReason::NoData => "no_data",
            FallbackReason::NoEntity => "no_entity",
            FallbackReason::NoMatches => "no_matches",
        }
    }
}

/// Three placeholder cards sharing one id family.
pub fn fallback_blocks(reason: FallbackReason, kind: EntityKind) -> [HighlightBlock; 3] {
    let family = reason.family();
    let first_sub = match reason {
        FallbackReason::NoData => "No data available".to_string(),
        FallbackReason::NoEntity => format!("No {} specified", kind),
        FallbackReason::NoMatches => format!("No data for this {}", kind),
    };

    let placeholder = |id: String, title: &str, main: &str, sub: String, flavor: &str| HighlightBlock {
        id,
        title: title.to_string(),
        accent: Accent::Slate,
        main_value: main.to_string(),
        sub_value: sub,
        footer: String::new(),
        category: None,
        flavor: Some(flavor.to_string()),
    };

    [
        placeholder(
            family.to_string(),
            "📦 No Data",
            "0 matches",
            first_sub,
            "Invisible mode engaged.",
        ),
        placeholder(
            format!("{}_2", family),
            "😴 No Stats",
            "N/A",
            "No information available".to_string(),
            "Not even on the radar.",
        ),
        placeholder(
            format!("{}_3", family),
            "🤷 No Highlights",
            "N/A",
            "No highlights available".to_string(),
            "Prefers to stay anonymous.",
        ),
    ]
}

/// Exactly three highlight cards for `name`.
///
/// Records are filtered by hero name or player name depending on `kind`.
/// Never fails: empty input, a blank name, an unknown entity and internal
/// scoring errors each map to a fallback triple.
pub fn select_highlights(
    records: &[MatchRecord],
    name: &str,
    kind: EntityKind,
    flavor: &dyn FlavorSource,
) -> [HighlightBlock; 3] {
    if records.is_empty() {
        return fallback_blocks(FallbackReason::NoData, kind);
    }

    let name = name.trim();
    if name.is_empty() {
        return fallback_blocks(FallbackReason::NoEntity, kind);
    }

    let own: Vec<&MatchRecord> = records.iter().filter(|r| kind.key(r) == name).collect();
    if own.is_empty() {
        warn!("No records for {} {:?} among {} rows", kind, name, records.len());
        return fallback_blocks(FallbackReason::NoMatches, kind);
    }
    debug!("Selecting highlights for {} {:?} from {} rows", kind, name, own.len());

    match assemble(&own, kind) {
        Ok(mut blocks) => {
            for block in blocks.iter_mut() {
                block.flavor = flavor.pick(flavor_pool(block.family())).map(str::to_string);
            }
            blocks
        }
        Err(e) => {
            error!("Highlight selection for {} {:?} failed: {}", kind, name, e);
            fallback_blocks(FallbackReason::NoMatches, kind)
        }
    }
}

fn assemble(rows: &[&MatchRecord], kind: EntityKind) -> Result<[HighlightBlock; 3], HighlightError> {
    let mut blocks = vec![most_violent(rows, kind)?];

    let candidates = generate_candidates(rows, kind)?;
    blocks.extend(
        select_candidates(candidates, SCORED_SLOTS)
            .into_iter()
            .map(|c| c.block),
    );

    if blocks.len() < 2 {
        blocks.push(generic_matches(rows, kind));
    }
    if blocks.len() < 3 {
        blocks.push(avg_time_dead(rows));
    }

    let count = blocks.len();
    <[HighlightBlock; 3]>::try_from(blocks).map_err(|_| HighlightError::BlockCount(count))
}

fn generic_matches(rows: &[&MatchRecord], kind: EntityKind) -> HighlightBlock {
    let matches = rows.len();
    let wins = rows.iter().filter(|r| r.winner).count();
    let title = match kind {
        GroupKey::Hero => "📦 Matches on this Hero",
        GroupKey::Player => "📦 Matches Played",
    };

    HighlightBlock {
        id: "generic_matches".to_string(),
        title: title.to_string(),
        accent: Accent::Slate,
        main_value: format!("{} matches", matches),
        sub_value: format!(
            "Win rate: {}",
            format_percent(safe_divide(wins as f64, matches as f64))
        ),
        footer: format!("{} wins", wins),
        category: None,
        flavor: None,
    }
}

fn avg_time_dead(rows: &[&MatchRecord]) -> HighlightBlock {
    let total: u64 = rows.iter().map(|r| r.spent_dead_seconds as u64).sum();
    let average = safe_divide(total as f64, rows.len() as f64);

    HighlightBlock {
        id: "avg_time_dead".to_string(),
        title: "😴 Average Time Dead".to_string(),
        accent: Accent::Purple,
        main_value: format_mm_ss(average),
        sub_value: "average time dead".to_string(),
        footer: format!("Across {} matches", rows.len()),
        category: None,
        flavor: None,
    }
}
