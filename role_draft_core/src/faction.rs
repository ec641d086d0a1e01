// Faction classification for role names.
//
// `classify` is the one place that decides which cap a role counts against.
// The pool builder calls it when snapshotting the catalog and the coordinator
// calls it again for any name the pool does not know (forced overrides, the
// baseline `Crewmate`), so the two can never disagree.
//
// The partition is static: three disjoint name tables (Impostor,
// NeutralKilling, Neutral) with Crewmate as the default. Lookups compare
// normalized names (lowercased, with whitespace, hyphens and underscores
// stripped), so "Serial Killer", "serial-killer" and "SerialKiller" are the
// same role.

use serde::{Deserialize, Serialize};

/// Coarse role category used for draft caps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    Crewmate,
    Impostor,
    NeutralKilling,
    /// Non-killing neutrals (the "passive" cap).
    Neutral,
}

/// The role every offer falls back to when nothing else is draftable.
pub const BASELINE_ROLE: &str = "Crewmate";

const IMPOSTOR_ROLES: &[&str] = &[
    "impostor",
    "shapeshifter",
    "phantom",
    "viper",
    "bountyhunter",
    "vampire",
    "warlock",
    "witch",
    "mafia",
    "janitor",
    "trickster",
    "morphling",
    "miner",
    "escapist",
    "camouflager",
    "disperser",
    "eviltracker",
    "puppeteer",
    "swooper",
    "undertaker",
    "consigliere",
    "blackmailer",
    "bomber",
    "cleaner",
    "fireworker",
    "godfather",
    "greedy",
    "hangman",
    "lightning",
    "ninja",
    "quickshooter",
    "saboteur",
    "sniper",
    "timethief",
    "trapster",
    "twister",
    "underdog",
];

const NEUTRAL_KILLING_ROLES: &[&str] = &[
    "jackal",
    "juggernaut",
    "pelican",
    "glitch",
    "werewolf",
    "pestilence",
    "plaguebearer",
    "arsonist",
    "bandit",
    "bloodknight",
    "demon",
    "hexmaster",
    "infectious",
    "medusa",
    "necromancer",
    "pickpocket",
    "pyromaniac",
    "serialkiller",
    "shroud",
    "spiritcaller",
    "traitor",
    "virus",
    "wraith",
    "agitater",
    "berserker",
    "poisoner",
];

const NEUTRAL_ROLES: &[&str] = &[
    "jester",
    "executioner",
    "lawyer",
    "opportunist",
    "amnesiac",
    "pursuer",
    "follower",
    "romantic",
    "collector",
    "doomsayer",
    "maverick",
    "innocent",
    "terrorist",
    "workaholic",
    "provocateur",
    "hater",
    "pixie",
    "revolutionist",
    "schrodingerscat",
    "taskinator",
    "totocalcio",
    "vulture",
    "sunnyboy",
    "seeker",
    "pirate",
    "cursedsoul",
    "imitator",
    "shaman",
];

/// Canonical comparison key for a role name.
pub fn normalize_role_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_' && *c != '\'')
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ö' { 'o' } else { c })
        .collect()
}

/// Faction for a role name. Unknown names are Crewmate.
pub fn classify(name: &str) -> Faction {
    let key = normalize_role_name(name);
    let key = key.as_str();
    if IMPOSTOR_ROLES.contains(&key) {
        Faction::Impostor
    } else if NEUTRAL_KILLING_ROLES.contains(&key) {
        Faction::NeutralKilling
    } else if NEUTRAL_ROLES.contains(&key) {
        Faction::Neutral
    } else {
        Faction::Crewmate
    }
}
