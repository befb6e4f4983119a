//! User preference memory: a single file mapping each user to their
//! learned category budget weights.

use crate::error::Result;
use crate::graph::atomic_write_json;
use banquet_types::Category;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The `user_pref_memory.json` store: `map<user_id, {category: weight}>`,
/// weights summing to 1.0 (tolerating rounding).
pub struct UserPrefsMemory {
    path: PathBuf,
    prefs: Mutex<BTreeMap<String, BTreeMap<Category, f64>>>,
}

impl UserPrefsMemory {
    /// Load `user_pref_memory.json` from `path`, or start empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let prefs = if path.exists() {
            let bytes = std::fs::read(&path).map_err(|source| crate::error::GraphError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_slice(&bytes).map_err(|source| crate::error::GraphError::Malformed {
                path: path.display().to_string(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            prefs: Mutex::new(prefs),
        })
    }

    /// `user_id`'s stored weights, if any have ever been persisted.
    pub fn get(&self, user_id: &str) -> Option<BTreeMap<Category, f64>> {
        self.prefs.lock().get(user_id).cloned()
    }

    /// Overwrite `user_id`'s weights and persist immediately.
    ///
    /// Callers are expected to pass already-renormalized weights (summing
    /// to 1.0 within rounding tolerance); this store does not itself
    /// renormalize.
    pub fn set(&self, user_id: impl Into<String>, weights: BTreeMap<Category, f64>) -> Result<()> {
        self.prefs.lock().insert(user_id.into(), weights);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let prefs = self.prefs.lock();
        atomic_write_json(&self.path, &*prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_pref_memory.json");
        let memory = UserPrefsMemory::load(&path).unwrap();

        let mut weights = BTreeMap::new();
        weights.insert(Category::Venue, 0.4);
        weights.insert(Category::Catering, 0.35);
        weights.insert(Category::Decor, 0.25);
        memory.set("user-1", weights.clone()).unwrap();

        let reloaded = UserPrefsMemory::load(&path).unwrap();
        assert_eq!(reloaded.get("user-1"), Some(weights));
        assert!(reloaded.get("nobody").is_none());
    }
}
