//! Cosmetic one-liners attached to highlight cards.

use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Line used when a block family has no pool of its own.
pub const DEFAULT_FLAVOR: &str = "Interesting, if not exactly hilarious.";

/// Picks one line from a pool.
pub trait FlavorSource {
    fn pick(&self, pool: &'static [&'static str]) -> Option<&'static str>;
}

/// Uniformly random choice from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomFlavor;

impl FlavorSource for RandomFlavor {
    fn pick(&self, pool: &'static [&'static str]) -> Option<&'static str> {
        pool.choose(&mut rand::thread_rng()).copied()
    }
}

/// Reproducible random choice from a seeded generator.
#[derive(Debug)]
pub struct SeededFlavor {
    rng: RefCell<StdRng>,
}

impl SeededFlavor {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl FlavorSource for SeededFlavor {
    fn pick(&self, pool: &'static [&'static str]) -> Option<&'static str> {
        pool.choose(&mut *self.rng.borrow_mut()).copied()
    }
}

/// Always the first line of the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFlavor;

impl FlavorSource for FirstFlavor {
    fn pick(&self, pool: &'static [&'static str]) -> Option<&'static str> {
        pool.first().copied()
    }
}

/// Never attaches a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFlavor;

impl FlavorSource for NoFlavor {
    fn pick(&self, _pool: &'static [&'static str]) -> Option<&'static str> {
        None
    }
}

/// Pool of lines for a block family.
pub fn flavor_pool(family: &str) -> &'static [&'static str] {
    match family {
        "most_violent" => &[
            "You left your lane and broke the game.",
            "The damage meter asked for a break.",
            "Matchmaking sent an apology.",
            "That damage wasn't necessary, but it was appreciated.",
            "The replay should ship with a warning.",
        ],
        "most_time_dead" => &[
            "Basically a respawn screen enthusiast.",
            "The respawn timer knew you by name.",
            "More time dead than an NPC.",
            "Spectator mode, but from the inside.",
            "At this point you knew the map from the floor.",
        ],
        "most_healing" => &[
            "If healing paid rent you'd own a house.",
            "The doctor everyone needed.",
            "Your team owes you their lives.",
            "Single-handedly outhealed the hospital.",
        ],
        "most_deaths" => &[
            "Fearless. Also careless.",
            "The enemy team thanks you for the experience.",
            "Diving is a lifestyle.",
            "Someone had to tank the respawn timer.",
        ],
        "pacifist_win" => &[
            "Violence was never the answer.",
            "Won on vibes alone.",
            "Macro brain, micro kills.",
            "Who needs kills when you have objectives?",
        ],
        "speedrun" => &[
            "Any% glitchless.",
            "Blink and you missed it.",
            "Someone had a dinner reservation.",
            "The loading screen lasted longer.",
        ],
        "raid_boss" => &[
            "Absorbed damage like a sponge.",
            "The enemy team ran out of mana first.",
            "Built like a raid boss.",
            "Pain is just information.",
        ],
        "protagonist" => &[
            "Main character energy.",
            "The plot armor was real.",
            "The rest of the team were extras.",
            "Carried harder than a backpack.",
        ],
        "push_enjoyer" => &[
            "Objectives over ego.",
            "Buildings fear you.",
            "Hero damage is a social construct.",
            "The forts filed a complaint.",
        ],
        "socializer" => &[
            "Team player of the year.",
            "Every kill had your fingerprints on it.",
            "Sharing is caring.",
            "Present at every fight.",
        ],
        "generic_matches" => &[
            "Consistency is its own highlight.",
            "Quantity has a quality of its own.",
            "Showing up is half the battle.",
        ],
        "avg_time_dead" => &[
            "Plenty of time for a snack break.",
            "Respawn with experience.",
            "Dying is part of the gameplay.",
            "You learned patience here.",
        ],
        _ => &[DEFAULT_FLAVOR],
    }
}
