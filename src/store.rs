// src/store.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::{Period, RecordSet, UsageDocument, UsageRecord};

/// Reads the canonical per-month usage documents from the stats tree.
///
/// Gaps in the historical record are expected, not a fault: a missing or
/// unreadable document for a month degrades to an empty record set, as does
/// a document that parses but carries no entity mapping.
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the canonical document for one month.
    pub fn document_path(&self, period: Period) -> PathBuf {
        self.root
            .join(period.to_string())
            .join("pretty")
            .join("usage.json")
    }

    /// Load the record set for `period`, preserving document order.
    ///
    /// A record without a `usage_perc` field counts as 0.0.
    pub fn load(&self, period: Period) -> RecordSet {
        let path = self.document_path(period);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                warn!(%period, path = %path.display(), "no usage document for month");
                return Vec::new();
            }
        };
        let doc: UsageDocument = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(%period, error = %e, "unparsable usage document, treating as missing");
                return Vec::new();
            }
        };
        if doc.pokemon_data.is_empty() {
            warn!(%period, "usage document carries no usage records");
            return Vec::new();
        }
        doc.pokemon_data
            .into_iter()
            .map(|(name, stats)| UsageRecord {
                name,
                usage_perc: stats.usage_perc,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn period(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn write_doc(root: &Path, month: &str, text: &str) {
        let dir = root.join(month).join("pretty");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("usage.json"), text).unwrap();
    }

    #[test]
    fn missing_document_yields_empty() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());
        assert!(store.load(period("2023-01")).is_empty());
    }

    #[test]
    fn unparsable_document_yields_empty() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "2023-01", "{not json");
        let store = SnapshotStore::new(tmp.path());
        assert!(store.load(period("2023-01")).is_empty());
    }

    #[test]
    fn document_without_mapping_yields_empty() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "2023-01", r#"{"total_battles": 4160}"#);
        let store = SnapshotStore::new(tmp.path());
        assert!(store.load(period("2023-01")).is_empty());
    }

    #[test]
    fn missing_share_defaults_to_zero() {
        let tmp = TempDir::new().unwrap();
        let doc = json!({"pokemon_data": {"Tauros": {"rank": 1}}});
        write_doc(tmp.path(), "2023-01", &doc.to_string());
        let store = SnapshotStore::new(tmp.path());
        let records = store.load(period("2023-01"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Tauros");
        assert_eq!(records[0].usage_perc, 0.0);
    }

    #[test]
    fn records_keep_document_order() {
        let tmp = TempDir::new().unwrap();
        let doc = json!({"pokemon_data": {
            "Snorlax": {"usage_perc": 60.1},
            "Tauros": {"usage_perc": 85.4},
            "Chansey": {"usage_perc": 55.0}
        }});
        write_doc(tmp.path(), "2023-01", &doc.to_string());
        let store = SnapshotStore::new(tmp.path());
        let names: Vec<String> = store
            .load(period("2023-01"))
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Snorlax", "Tauros", "Chansey"]);
    }
}
