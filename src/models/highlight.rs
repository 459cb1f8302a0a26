//! Highlight card model.

use serde::{Deserialize, Serialize};

/// Thematic tag used to keep the three highlight blocks distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Damage,
    TimeDead,
    Healing,
    Deaths,
    Pacifist,
    Speedrun,
    DamageTaken,
    Kda,
    Siege,
    Assists,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Damage => "damage",
            Category::TimeDead => "time_dead",
            Category::Healing => "healing",
            Category::Deaths => "deaths",
            Category::Pacifist => "pacifist",
            Category::Speedrun => "speedrun",
            Category::DamageTaken => "damage_taken",
            Category::Kda => "kda",
            Category::Siege => "siege",
            Category::Assists => "assists",
        };
        write!(f, "{}", name)
    }
}

/// Card colour hint for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Red,
    Purple,
    Teal,
    Amber,
    Slate,
}

/// One of the three narrative cards returned for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightBlock {
    /// Stable block identifier (e.g. `most_violent`, `no_data_2`)
    pub id: String,
    pub title: String,
    pub accent: Accent,
    pub main_value: String,
    pub sub_value: String,
    pub footer: String,
    /// Theme of a scored block; `None` for generic and fallback blocks
    pub category: Option<Category>,
    /// Cosmetic one-liner, if a flavor source supplied one
    pub flavor: Option<String>,
}

impl HighlightBlock {
    /// Family the block belongs to: its id without a trailing `_<n>` suffix.
    pub fn family(&self) -> &str {
        match self.id.rsplit_once('_') {
            Some((stem, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => stem,
            _ => &self.id,
        }
    }
}
