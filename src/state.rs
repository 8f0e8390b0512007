use crate::models::ScrapeResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to write state file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to serialize state: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StateError>;

/// Last-seen version for one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub version: String,
    pub date: Option<String>,
}

/// A board changed its newest version since the previous run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub board: String,
    pub previous: Option<String>,
    pub current: String,
}

/// Flat JSON snapshot mapping board identity to last-seen version. Used only
/// to detect change across runs; not a database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    boards: BTreeMap<String, BoardState>,
}

impl Snapshot {
    /// Load from disk. A missing, unreadable or corrupt file starts fresh;
    /// losing change-detection for one run beats aborting the batch.
    pub fn load<P: AsRef<Path>>(path: P) -> Snapshot {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt state file, starting fresh");
                    Snapshot::default()
                }
            },
            Err(_) => Snapshot::default(),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&BoardState> {
        self.boards.get(key)
    }

    /// Fold one scrape result into the snapshot. Returns the change when the
    /// board's newest version differs from last run. Failed or empty scrapes
    /// leave the stored state untouched.
    pub fn observe(&mut self, key: &str, result: &ScrapeResult) -> Option<Change> {
        if !result.ok {
            return None;
        }
        let latest = result.latest()?;
        let current = BoardState {
            version: latest.version.display_version(),
            date: latest.date_iso(),
        };
        let previous = match self.boards.get(key) {
            Some(prev) if prev.version == current.version => return None,
            prev => prev.map(|p| p.version.clone()),
        };
        let change = Change {
            board: key.to_string(),
            previous,
            current: current.version.clone(),
        };
        self.boards.insert(key.to_string(), current);
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatedEntry, Vendor, VersionCandidate};
    use chrono::NaiveDate;

    fn result_with(version: &str, date: Option<NaiveDate>) -> ScrapeResult {
        ScrapeResult::success(
            Vendor::Gigabyte,
            "B650 AORUS ELITE AX",
            "https://example.com",
            vec![DatedEntry {
                version: VersionCandidate::new(version, 0),
                date,
            }],
        )
    }

    #[test]
    fn test_missing_file_is_empty() {
        let snapshot = Snapshot::load("/nonexistent/path/state.json");
        assert!(snapshot.get("anything").is_none());
    }

    #[test]
    fn test_first_observation_is_a_change() {
        let mut snapshot = Snapshot::default();
        let change = snapshot.observe("GIGABYTE/X", &result_with("F10", None));
        let change = change.expect("first sighting should register");
        assert_eq!(change.previous, None);
        assert_eq!(change.current, "F10");
    }

    #[test]
    fn test_same_version_is_not_a_change() {
        let mut snapshot = Snapshot::default();
        snapshot.observe("GIGABYTE/X", &result_with("F10", None));
        assert!(snapshot
            .observe("GIGABYTE/X", &result_with("F10", None))
            .is_none());
    }

    #[test]
    fn test_new_version_registers_with_previous() {
        let mut snapshot = Snapshot::default();
        snapshot.observe("GIGABYTE/X", &result_with("F10", None));
        let change = snapshot
            .observe("GIGABYTE/X", &result_with("F11", None))
            .expect("version bump should register");
        assert_eq!(change.previous.as_deref(), Some("F10"));
        assert_eq!(change.current, "F11");
    }

    #[test]
    fn test_failed_scrape_leaves_state() {
        let mut snapshot = Snapshot::default();
        snapshot.observe("GIGABYTE/X", &result_with("F10", None));
        let failed = ScrapeResult::failure(Vendor::Gigabyte, "X", "https://example.com", "nope");
        assert!(snapshot.observe("GIGABYTE/X", &failed).is_none());
        assert_eq!(snapshot.get("GIGABYTE/X").unwrap().version, "F10");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut snapshot = Snapshot::default();
        snapshot.observe(
            "GIGABYTE/X",
            &result_with("F10", NaiveDate::from_ymd_opt(2024, 5, 1)),
        );

        let path = std::env::temp_dir().join(format!("bioswatch-state-{}.json", std::process::id()));
        snapshot.save(&path).unwrap();
        let loaded = Snapshot::load(&path);
        std::fs::remove_file(&path).ok();

        let state = loaded.get("GIGABYTE/X").unwrap();
        assert_eq!(state.version, "F10");
        assert_eq!(state.date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let path = std::env::temp_dir().join(format!("bioswatch-corrupt-{}.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let snapshot = Snapshot::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(snapshot.get("anything").is_none());
    }
}
