//! A running success-rate log shared by the three category retrieval
//! layers: every `update(key, success)` call nudges that key's success
//! rate by the same incremental-average rule as a usage counter.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One key's running success statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEntry {
    /// Running average of `success` observations, in `[0, 1]`.
    pub success_rate: f64,
    /// How many observations have been folded in.
    pub usage_count: u32,
    /// When this key was last updated.
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SuccessLogFile {
    #[serde(default)]
    success_patterns: BTreeMap<String, SuccessEntry>,
}

/// A JSON-backed map from pattern key to [`SuccessEntry`].
pub struct SuccessLog {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, SuccessEntry>>,
}

impl SuccessLog {
    /// Load the log at `path`, or start empty if it doesn't exist.
    pub fn load(path: PathBuf) -> crate::error::Result<Self> {
        let file: SuccessLogFile = crate::persist::load_or_default(&path)?;
        Ok(Self {
            path,
            entries: Mutex::new(file.success_patterns),
        })
    }

    /// Fold in one observation for `key`: `rate = (rate*n + success) / (n+1)`.
    pub fn update(&self, key: &str, success: bool) -> crate::error::Result<()> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_insert(SuccessEntry {
            success_rate: 0.0,
            usage_count: 0,
            last_used: Utc::now(),
        });
        let observation = if success { 1.0 } else { 0.0 };
        entry.success_rate = (entry.success_rate * entry.usage_count as f64 + observation)
            / (entry.usage_count as f64 + 1.0);
        entry.usage_count += 1;
        entry.last_used = Utc::now();

        let snapshot = SuccessLogFile {
            success_patterns: entries.clone(),
        };
        drop(entries);
        crate::persist::save(&self.path, &snapshot)
    }

    /// The current entry for `key`, if it has ever been observed.
    pub fn get(&self, key: &str) -> Option<SuccessEntry> {
        self.entries.lock().get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_sets_rate_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let log = SuccessLog::load(dir.path().join("log.json")).unwrap();
        log.update("classic", true).unwrap();
        let entry = log.get("classic").unwrap();
        assert_eq!(entry.success_rate, 1.0);
        assert_eq!(entry.usage_count, 1);
    }

    #[test]
    fn mixed_outcomes_average_toward_the_observed_rate() {
        let dir = tempfile::tempdir().unwrap();
        let log = SuccessLog::load(dir.path().join("log.json")).unwrap();
        log.update("modern", true).unwrap();
        log.update("modern", false).unwrap();
        let entry = log.get("modern").unwrap();
        assert_eq!(entry.success_rate, 0.5);
        assert_eq!(entry.usage_count, 2);
    }

    #[test]
    fn persists_across_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        SuccessLog::load(path.clone()).unwrap().update("rustic", true).unwrap();
        let reloaded = SuccessLog::load(path).unwrap();
        assert_eq!(reloaded.get("rustic").unwrap().usage_count, 1);
    }
}
