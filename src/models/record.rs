//! Canonical per-match record.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Role;

/// One player-hero-match row after normalization.
///
/// Every numeric field is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MatchRecord {
    pub player_name: String,
    pub hero_name: String,
    pub map: String,
    /// Replay file name; free text, not unique.
    pub replay_id: String,

    pub role: Role,

    /// Calendar date of the match, when it could be reconstructed.
    pub date: Option<NaiveDate>,
    pub game_time_seconds: u32,

    pub winner: bool,

    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub takedowns: u32,

    pub hero_damage: f64,
    pub siege_damage: f64,
    pub damage_taken: f64,
    pub healing_shielding: f64,
    pub self_healing: f64,
    pub experience: f64,

    pub spent_dead_seconds: u32,
    pub on_fire_seconds: u32,

    pub team: String,
    pub game_mode: String,
    pub award: String,
}

impl MatchRecord {
    /// Create a zeroed record for a player/hero pair.
    pub fn new(player_name: impl Into<String>, hero_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            hero_name: hero_name.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the outcome.
    pub fn with_win(mut self, winner: bool) -> Self {
        self.winner = winner;
        self
    }

    /// Builder method to set the map.
    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = map.into();
        self
    }

    /// Builder method to set the match date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Builder method to set the game length.
    pub fn with_game_time(mut self, seconds: u32) -> Self {
        self.game_time_seconds = seconds;
        self
    }

    /// Builder method to set kills, deaths and assists.
    pub fn with_kda(mut self, kills: u32, deaths: u32, assists: u32) -> Self {
        self.kills = kills;
        self.deaths = deaths;
        self.assists = assists;
        self
    }

    /// Builder method to set hero and siege damage.
    pub fn with_damage(mut self, hero_damage: f64, siege_damage: f64) -> Self {
        self.hero_damage = hero_damage;
        self.siege_damage = siege_damage;
        self
    }

    /// Hero plus siege damage.
    pub fn total_damage(&self) -> f64 {
        self.hero_damage + self.siege_damage
    }

    /// `(kills + assists) / max(1, deaths)`.
    pub fn kda(&self) -> f64 {
        (self.kills as f64 + self.assists as f64) / self.deaths.max(1) as f64
    }

    /// Calendar year of the match, if dated.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}
