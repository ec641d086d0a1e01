// Canonical role registry.
//
// Built once at startup from the role catalog (plus the fallback pool's
// names, so a fallback draft can still be handed off). Each distinct
// normalized name gets an interned `RoleId`; the first spelling seen becomes
// the canonical display name. Role names are strings only at the protocol
// boundary. Hand-off resolves them here and the assignment sink receives a
// `RoleId`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::faction::{self, BASELINE_ROLE};
use crate::pool::{FALLBACK_ROLES, RoleCatalog};

/// Interned role identifier, stable for the registry's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub u16);

/// Normalized-name → `RoleId` lookup plus canonical names.
#[derive(Clone, Debug, Default)]
pub struct RoleRegistry {
    canonical: Vec<String>,
    by_key: BTreeMap<String, RoleId>,
}

impl RoleRegistry {
    /// Register every readable catalog name, then the baseline and fallback
    /// names. Unreadable catalog entries are skipped.
    pub fn from_catalog(catalog: &dyn RoleCatalog) -> Self {
        let mut registry = RoleRegistry::default();
        for desc in catalog.role_descriptors().into_iter().flatten() {
            registry.register(&desc.name);
        }
        registry.register(BASELINE_ROLE);
        for name in FALLBACK_ROLES {
            registry.register(name);
        }
        registry
    }

    /// Intern a name, returning the existing ID when its normalized form is
    /// already known. Names that normalize to nothing are not registered.
    pub fn register(&mut self, name: &str) -> Option<RoleId> {
        let key = faction::normalize_role_name(name);
        if key.is_empty() {
            return None;
        }
        if let Some(id) = self.by_key.get(&key) {
            return Some(*id);
        }
        let id = RoleId(u16::try_from(self.canonical.len()).ok()?);
        self.canonical.push(name.trim().to_string());
        self.by_key.insert(key, id);
        Some(id)
    }

    /// Case/space/hyphen-insensitive lookup.
    pub fn resolve(&self, name: &str) -> Option<RoleId> {
        self.by_key.get(&faction::normalize_role_name(name)).copied()
    }

    pub fn canonical_name(&self, id: RoleId) -> Option<&str> {
        self.canonical.get(usize::from(id.0)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}
