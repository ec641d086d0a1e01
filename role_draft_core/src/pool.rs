// Role pool construction.
//
// A `RolePool` is the host's per-session snapshot of what may be drafted:
// the role names in discovery order plus, for each, a max count, a sampling
// weight and a faction. It is built once in `start_draft` and never changes
// until the session resets; later catalog edits do not leak into a running
// draft.
//
// Inclusion rules for a catalog descriptor:
// - it reads without error (a failing entry is logged and skipped),
// - it is enabled (spawn-eligible under the current game mode),
// - it is not one of the `NON_ASSIGNABLE` ghost/observer pseudo-roles,
// - both its configured max count and spawn chance are > 0.
// Weights and max counts are clamped to at least 1.
//
// If nothing survives, the pool is the built-in `FALLBACK_ROLES` list with
// max count 1 and weight 100 each, so the coordinator always has something
// to offer.
//
// Faction comes from `faction::classify`, never from the descriptor; the
// descriptor's own faction is only cross-checked and a mismatch logged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::faction::{self, Faction};

/// One role as described by the external role registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
    pub name: String,
    pub enabled: bool,
    /// Configured per-game max count; `<= 0` excludes the role.
    pub max_count: i32,
    /// Configured spawn chance (percent-ish); `<= 0` excludes the role.
    pub chance: i32,
    /// Faction as the registry reports it. Informational only.
    #[serde(default)]
    pub faction: Option<Faction>,
}

/// Failure reading one role's metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("role entry {index}: {reason}")]
    Malformed { index: usize, reason: String },
    #[error("role {name}: option unavailable: {reason}")]
    OptionUnavailable { name: String, reason: String },
}

/// Source of role descriptors. One `Result` per role so a single bad entry
/// cannot sink the whole enumeration.
pub trait RoleCatalog {
    fn role_descriptors(&self) -> Vec<Result<RoleDescriptor, MetadataError>>;
}

impl RoleCatalog for Vec<RoleDescriptor> {
    fn role_descriptors(&self) -> Vec<Result<RoleDescriptor, MetadataError>> {
        self.iter().cloned().map(Ok).collect()
    }
}

/// Pseudo-roles that exist in the registry but can never be handed out.
pub const NON_ASSIGNABLE: &[&str] = &[
    "GM",
    "GuardianAngel",
    "CrewmateGhost",
    "ImpostorGhost",
    "Spectator",
    "Observer",
];

/// Pool used when the catalog yields nothing draftable.
pub const FALLBACK_ROLES: &[&str] = &[
    "Sheriff",
    "Mayor",
    "Medic",
    "Engineer",
    "Snitch",
    "Investigator",
    "Jester",
    "Executioner",
    "Jackal",
    "Serial Killer",
    "Impostor",
    "Vampire",
];

const FALLBACK_WEIGHT: u32 = 100;

/// Per-session snapshot of draftable roles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePool {
    roles: Vec<String>,
    max_count: BTreeMap<String, u32>,
    weight: BTreeMap<String, u32>,
    faction: BTreeMap<String, Faction>,
}

impl RolePool {
    /// Snapshot the catalog. Never fails and never returns an empty pool.
    pub fn build(catalog: &dyn RoleCatalog) -> Self {
        let mut pool = RolePool::default();
        for entry in catalog.role_descriptors() {
            let desc = match entry {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable role metadata");
                    continue;
                }
            };
            if !desc.enabled || desc.max_count <= 0 || desc.chance <= 0 {
                continue;
            }
            if is_non_assignable(&desc.name) {
                continue;
            }
            let derived = faction::classify(&desc.name);
            if let Some(reported) = desc.faction {
                if reported != derived {
                    tracing::debug!(
                        role = %desc.name,
                        ?reported,
                        ?derived,
                        "catalog faction disagrees with classifier; using classifier"
                    );
                }
            }
            pool.insert(
                desc.name,
                desc.max_count.unsigned_abs(),
                desc.chance.unsigned_abs(),
            );
        }

        if pool.is_empty() {
            tracing::warn!("no draftable roles configured; using built-in fallback pool");
            return Self::fallback();
        }
        pool
    }

    /// The built-in pool: every `FALLBACK_ROLES` entry, max 1, weight 100.
    pub fn fallback() -> Self {
        let mut pool = RolePool::default();
        for name in FALLBACK_ROLES {
            pool.insert((*name).to_string(), 1, FALLBACK_WEIGHT);
        }
        pool
    }

    /// Add a role, clamping max count and weight to >= 1. A repeated name
    /// keeps its first position and takes the latest numbers.
    fn insert(&mut self, name: String, max_count: u32, weight: u32) {
        if !self.max_count.contains_key(&name) {
            self.roles.push(name.clone());
        }
        self.faction.insert(name.clone(), faction::classify(&name));
        self.max_count.insert(name.clone(), max_count.max(1));
        self.weight.insert(name, weight.max(1));
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.max_count.contains_key(role)
    }

    /// Sampling weight; 0 for names outside the pool.
    pub fn weight(&self, role: &str) -> u32 {
        self.weight.get(role).copied().unwrap_or(0)
    }

    /// Max draft count; `None` for names outside the pool.
    pub fn max_count(&self, role: &str) -> Option<u32> {
        self.max_count.get(role).copied()
    }

    /// Faction from the snapshot, re-derived from the classifier when the
    /// snapshot has no entry.
    pub fn faction(&self, role: &str) -> Faction {
        self.faction
            .get(role)
            .copied()
            .unwrap_or_else(|| faction::classify(role))
    }
}

fn is_non_assignable(name: &str) -> bool {
    let key = faction::normalize_role_name(name);
    NON_ASSIGNABLE
        .iter()
        .any(|n| faction::normalize_role_name(n) == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(name: &str, enabled: bool, max_count: i32, chance: i32) -> RoleDescriptor {
        RoleDescriptor {
            name: name.into(),
            enabled,
            max_count,
            chance,
            faction: None,
        }
    }

    struct FlakyCatalog;

    impl RoleCatalog for FlakyCatalog {
        fn role_descriptors(&self) -> Vec<Result<RoleDescriptor, MetadataError>> {
            vec![
                Ok(desc("Sheriff", true, 1, 50)),
                Err(MetadataError::OptionUnavailable {
                    name: "Mayor".into(),
                    reason: "option id missing".into(),
                }),
                Ok(desc("Jester", true, 2, 30)),
            ]
        }
    }

    #[test]
    fn inclusion_rules() {
        let catalog = vec![
            desc("Sheriff", true, 1, 100),
            desc("Mayor", false, 1, 100),
            desc("Medic", true, 0, 100),
            desc("Snitch", true, 1, 0),
            desc("Guardian Angel", true, 1, 100),
            desc("GM", true, 1, 100),
            desc("Jester", true, 2, 40),
        ];
        let pool = RolePool::build(&catalog);
        assert_eq!(pool.roles(), &["Sheriff".to_string(), "Jester".to_string()]);
        assert_eq!(pool.max_count("Jester"), Some(2));
        assert_eq!(pool.weight("Jester"), 40);
        assert_eq!(pool.faction("Jester"), Faction::Neutral);
    }

    #[test]
    fn failing_entry_is_skipped_not_fatal() {
        let pool = RolePool::build(&FlakyCatalog);
        assert_eq!(pool.len(), 2);
        assert!(pool.contains("Sheriff"));
        assert!(!pool.contains("Mayor"));
    }

    #[test]
    fn empty_catalog_falls_back() {
        let pool = RolePool::build(&Vec::<RoleDescriptor>::new());
        assert_eq!(pool.len(), FALLBACK_ROLES.len());
        for role in pool.roles() {
            assert_eq!(pool.max_count(role), Some(1));
            assert_eq!(pool.weight(role), FALLBACK_WEIGHT);
        }
        assert_eq!(pool.faction("Serial Killer"), Faction::NeutralKilling);
        assert_eq!(pool.faction("Vampire"), Faction::Impostor);
    }

    #[test]
    fn all_disabled_falls_back() {
        let catalog = vec![desc("Sheriff", false, 1, 100)];
        assert_eq!(RolePool::build(&catalog), RolePool::fallback());
    }

    #[test]
    fn classifier_overrides_reported_faction() {
        let mut d = desc("Jackal", true, 1, 10);
        d.faction = Some(Faction::Crewmate);
        let pool = RolePool::build(&vec![d]);
        assert_eq!(pool.faction("Jackal"), Faction::NeutralKilling);
    }

    #[test]
    fn unknown_names_use_classifier() {
        let pool = RolePool::fallback();
        assert_eq!(pool.weight("Witch"), 0);
        assert_eq!(pool.max_count("Witch"), None);
        assert_eq!(pool.faction("Witch"), Faction::Impostor);
    }
}
