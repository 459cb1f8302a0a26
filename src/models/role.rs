//! Hero roles and the hero → role lookup table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Role category a hero belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Role {
    Tank,
    Bruiser,
    #[serde(rename = "Ranged Assassin")]
    RangedAssassin,
    #[serde(rename = "Melee Assassin")]
    MeleeAssassin,
    Healer,
    Support,
    #[default]
    Unknown,
}

impl Role {
    /// Parse a free-text role label as found in source data.
    ///
    /// Case and inner whitespace are ignored, the common "assasin" misspelling
    /// is accepted, and "mage" is folded into [`Role::RangedAssassin`].
    /// Returns `None` for anything unrecognised so callers can fall back to
    /// the hero table.
    pub fn from_label(label: &str) -> Option<Self> {
        let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
        match collapsed.to_lowercase().as_str() {
            "tank" => Some(Role::Tank),
            "bruiser" => Some(Role::Bruiser),
            "ranged assassin" | "ranged assasin" | "mage" => Some(Role::RangedAssassin),
            "melee assassin" | "melee assasin" => Some(Role::MeleeAssassin),
            "healer" => Some(Role::Healer),
            "support" => Some(Role::Support),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Tank => write!(f, "Tank"),
            Role::Bruiser => write!(f, "Bruiser"),
            Role::RangedAssassin => write!(f, "Ranged Assassin"),
            Role::MeleeAssassin => write!(f, "Melee Assassin"),
            Role::Healer => write!(f, "Healer"),
            Role::Support => write!(f, "Support"),
            Role::Unknown => write!(f, "Unknown"),
        }
    }
}

const BUILTIN_HERO_ROLES: &[(&str, Role)] = &[
    ("Anub'arak", Role::Tank),
    ("Arthas", Role::Tank),
    ("Blaze", Role::Tank),
    ("Cho", Role::Tank),
    ("Diablo", Role::Tank),
    ("E.T.C.", Role::Tank),
    ("Garrosh", Role::Tank),
    ("Johanna", Role::Tank),
    ("Mal'Ganis", Role::Tank),
    ("Mei", Role::Tank),
    ("Muradin", Role::Tank),
    ("Stitches", Role::Tank),
    ("Tyrael", Role::Tank),
    ("Varian", Role::Tank),
    ("Artanis", Role::Bruiser),
    ("Chen", Role::Bruiser),
    ("D.Va", Role::Bruiser),
    ("Deathwing", Role::Bruiser),
    ("Dehaka", Role::Bruiser),
    ("Gazlowe", Role::Bruiser),
    ("Hogger", Role::Bruiser),
    ("Imperius", Role::Bruiser),
    ("Leoric", Role::Bruiser),
    ("Malthael", Role::Bruiser),
    ("Ragnaros", Role::Bruiser),
    ("Rexxar", Role::Bruiser),
    ("Sonya", Role::Bruiser),
    ("Thrall", Role::Bruiser),
    ("Xul", Role::Bruiser),
    ("Yrel", Role::Bruiser),
    ("Azmodan", Role::RangedAssassin),
    ("Cassia", Role::RangedAssassin),
    ("Chromie", Role::RangedAssassin),
    ("Falstad", Role::RangedAssassin),
    ("Fenix", Role::RangedAssassin),
    ("Gall", Role::RangedAssassin),
    ("Genji", Role::RangedAssassin),
    ("Greymane", Role::RangedAssassin),
    ("Gul'dan", Role::RangedAssassin),
    ("Hanzo", Role::RangedAssassin),
    ("Jaina", Role::RangedAssassin),
    ("Junkrat", Role::RangedAssassin),
    ("Kael'thas", Role::RangedAssassin),
    ("Kel'Thuzad", Role::RangedAssassin),
    ("Li-Ming", Role::RangedAssassin),
    ("Lunara", Role::RangedAssassin),
    ("Mephisto", Role::RangedAssassin),
    ("Nazeebo", Role::RangedAssassin),
    ("Nova", Role::RangedAssassin),
    ("Orphea", Role::RangedAssassin),
    ("Probius", Role::RangedAssassin),
    ("Raynor", Role::RangedAssassin),
    ("Sgt. Hammer", Role::RangedAssassin),
    ("Sylvanas", Role::RangedAssassin),
    ("Tassadar", Role::RangedAssassin),
    ("Tracer", Role::RangedAssassin),
    ("Tychus", Role::RangedAssassin),
    ("Valla", Role::RangedAssassin),
    ("Zagara", Role::RangedAssassin),
    ("Zul'jin", Role::RangedAssassin),
    ("Alarak", Role::MeleeAssassin),
    ("Illidan", Role::MeleeAssassin),
    ("Kerrigan", Role::MeleeAssassin),
    ("Maiev", Role::MeleeAssassin),
    ("Murky", Role::MeleeAssassin),
    ("Qhira", Role::MeleeAssassin),
    ("Samuro", Role::MeleeAssassin),
    ("The Butcher", Role::MeleeAssassin),
    ("Valeera", Role::MeleeAssassin),
    ("Zeratul", Role::MeleeAssassin),
    ("Alexstrasza", Role::Healer),
    ("Ana", Role::Healer),
    ("Anduin", Role::Healer),
    ("Auriel", Role::Healer),
    ("Brightwing", Role::Healer),
    ("Deckard", Role::Healer),
    ("Kharazim", Role::Healer),
    ("Li Li", Role::Healer),
    ("Lt. Morales", Role::Healer),
    ("Lúcio", Role::Healer),
    ("Lucio", Role::Healer),
    ("Malfurion", Role::Healer),
    ("Rehgar", Role::Healer),
    ("Stukov", Role::Healer),
    ("Tyrande", Role::Healer),
    ("Uther", Role::Healer),
    ("Whitemane", Role::Healer),
    ("Abathur", Role::Support),
    ("Medivh", Role::Support),
    ("The Lost Vikings", Role::Support),
    ("Zarya", Role::Support),
];

/// Immutable hero name → role lookup.
///
/// The builtin table covers the shipped roster; tests and configuration can
/// build their own table or layer overrides on top.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: HashMap<String, Role>,
}

impl RoleTable {
    /// The builtin roster table.
    pub fn builtin() -> Self {
        BUILTIN_HERO_ROLES.iter().copied().collect()
    }

    /// Builder method layering overrides on top of this table.
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, Role)>,
        S: Into<String>,
    {
        for (hero, role) in overrides {
            self.roles.insert(hero.into(), role);
        }
        self
    }

    /// Look up a hero's role. Unknown or empty names map to `Unknown`.
    pub fn role_of(&self, hero_name: &str) -> Role {
        self.roles.get(hero_name).copied().unwrap_or_default()
    }
}

impl<'a> FromIterator<(&'a str, Role)> for RoleTable {
    fn from_iter<T: IntoIterator<Item = (&'a str, Role)>>(iter: T) -> Self {
        Self {
            roles: iter
                .into_iter()
                .map(|(hero, role)| (hero.to_string(), role))
                .collect(),
        }
    }
}
