// JSON-backed role catalog.
//
// The role settings file is a JSON array of descriptor objects:
//
//   [
//     { "name": "Sheriff", "enabled": true, "max_count": 1, "chance": 100 },
//     { "name": "Jester",  "enabled": true, "max_count": 1, "chance": 50,
//       "faction": "Neutral" }
//   ]
//
// The array is parsed as raw `serde_json::Value`s first and each element is
// converted on demand, so one malformed entry becomes a `MetadataError` for
// that role while its neighbours still load. Only a file that is not a JSON
// array at all is a `CatalogError`.

use std::path::Path;

use thiserror::Error;

use crate::pool::{MetadataError, RoleCatalog, RoleDescriptor};

/// The catalog as a whole could not be loaded.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reading role catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("role catalog is not a JSON array: {0}")]
    NotAnArray(#[from] serde_json::Error),
}

/// Role descriptors loaded from JSON.
#[derive(Clone, Debug, Default)]
pub struct JsonRoleCatalog {
    entries: Vec<serde_json::Value>,
}

impl JsonRoleCatalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RoleCatalog for JsonRoleCatalog {
    fn role_descriptors(&self) -> Vec<Result<RoleDescriptor, MetadataError>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<RoleDescriptor>(value.clone()).map_err(|e| {
                    MetadataError::Malformed {
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }
}
