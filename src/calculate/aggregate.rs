//! Single-pass fold of match records into per-entity accumulators.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{derive_rates_with, RateOptions};
use crate::models::{EntityAccumulator, MatchRecord, RankingEntry};

/// Dimension records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Hero,
    Player,
}

impl GroupKey {
    /// Grouping key of a record.
    pub fn key<'a>(&self, record: &'a MatchRecord) -> &'a str {
        match self {
            GroupKey::Hero => &record.hero_name,
            GroupKey::Player => &record.player_name,
        }
    }

    /// The opposing dimension: players of a hero, heroes of a player.
    pub fn counterpart<'a>(&self, record: &'a MatchRecord) -> &'a str {
        match self {
            GroupKey::Hero => &record.player_name,
            GroupKey::Player => &record.hero_name,
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Hero => write!(f, "hero"),
            GroupKey::Player => write!(f, "player"),
        }
    }
}

impl std::str::FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hero" | "heroes" => Ok(GroupKey::Hero),
            "player" | "players" => Ok(GroupKey::Player),
            other => Err(format!("unknown grouping: {}", other)),
        }
    }
}

/// Accumulators keyed by entity name, kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    entries: Vec<EntityAccumulator>,
    index: HashMap<String, usize>,
    total_records: usize,
}

impl Aggregation {
    pub fn get(&self, name: &str) -> Option<&EntityAccumulator> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityAccumulator> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records folded in; the pick-rate denominator.
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Derive a ranking entry for every accumulator, in first-seen order.
    pub fn derive(&self, options: &RateOptions) -> Vec<RankingEntry> {
        self.entries
            .iter()
            .map(|acc| derive_rates_with(acc, self.total_records, options))
            .collect()
    }
}

/// Fold records grouped by hero or player.
pub fn aggregate(records: &[MatchRecord], key: GroupKey) -> Aggregation {
    aggregate_by(records, |r| key.key(r), |r| key.counterpart(r))
}

/// Fold records with arbitrary key and counterpart extractors.
///
/// One pass over `records`; an accumulator is created on first sight of a
/// key and takes that record's role.
pub fn aggregate_by<K, C>(records: &[MatchRecord], key_fn: K, counterpart_fn: C) -> Aggregation
where
    K: Fn(&MatchRecord) -> &str,
    C: Fn(&MatchRecord) -> &str,
{
    let mut aggregation = Aggregation {
        total_records: records.len(),
        ..Default::default()
    };

    for record in records {
        let key = key_fn(record);
        let slot = match aggregation.index.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = aggregation.entries.len();
                aggregation
                    .entries
                    .push(EntityAccumulator::new(key, record.role));
                aggregation.index.insert(key.to_string(), slot);
                slot
            }
        };
        aggregation.entries[slot].absorb(record, counterpart_fn(record));
    }

    aggregation
}
