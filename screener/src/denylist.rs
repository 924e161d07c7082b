use std::collections::HashSet;
use std::path::Path;

use crate::address::Address;
use crate::error::{Result, ScreeningError};
use crate::metrics::set_denylist_entries;

/// Immutable set of prohibited addresses, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    entries: HashSet<Address>,
}

impl Denylist {
    /// Load a denylist from a JSON array of address strings.
    ///
    /// An empty `path` is not an error: it yields an empty denylist, which
    /// is how local screening is switched off.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Ok(Self::default());
        }

        let bytes = std::fs::read(path).map_err(|source| ScreeningError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: Vec<Address> =
            serde_json::from_slice(&bytes).map_err(|source| ScreeningError::DecodeDenylist {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(
            target: "denylist",
            "Read denylist from {}: {} entries",
            path.display(),
            raw.len()
        );

        let list: Self = raw.into_iter().collect();
        set_denylist_entries(list.len());
        Ok(list)
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.entries.contains(addr)
    }

    /// Number of distinct addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Address> for Denylist {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
