// src/normalize.rs

use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use tracing::warn;

use crate::error::ReportError;
use crate::model::{EntityStats, Period, UsageDocument};

/// Rebuild the canonical usage documents from the raw archive tables.
///
/// Each month's `usage.txt` is parsed into the `pretty/usage.json` document
/// the snapshot store consumes. Months without a raw file, or whose file
/// yields no usage rows, are skipped with a warning.
pub fn normalize_range(root: &Path, start: Period, end: Period) -> Result<(), ReportError> {
    for period in start.range_inclusive(end) {
        let raw_path = root.join(period.to_string()).join("usage.txt");
        let raw = match fs::read_to_string(&raw_path) {
            Ok(raw) => raw,
            Err(_) => {
                warn!(%period, path = %raw_path.display(), "no raw usage file, skipping");
                continue;
            }
        };

        let doc = parse_usage_table(&raw);
        if doc.pokemon_data.is_empty() {
            warn!(%period, "raw usage file has no usage rows, skipping");
            continue;
        }

        let pretty_dir = root.join(period.to_string()).join("pretty");
        fs::create_dir_all(&pretty_dir).map_err(|source| ReportError::WriteFile {
            path: pretty_dir.clone(),
            source,
        })?;
        let out = pretty_dir.join("usage.json");
        let text = serde_json::to_string_pretty(&doc).map_err(|e| ReportError::WriteFile {
            path: out.clone(),
            source: io::Error::other(e),
        })?;
        fs::write(&out, text).map_err(|source| ReportError::WriteFile {
            path: out.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Parse one raw archive usage table.
///
/// Data rows look like `| 1 | Tauros | 85.43425% | 3455 | 83.2% | ... |`;
/// header and rule lines fail the rank parse and fall through. Row order
/// carries through into the document so rank order survives serialization.
fn parse_usage_table(raw: &str) -> UsageDocument {
    let mut total_battles: Option<u64> = None;
    let mut entities: IndexMap<String, EntityStats> = IndexMap::new();

    for line in raw.lines() {
        if let Some(rest) = line.trim().strip_prefix("Total battles:") {
            total_battles = rest.trim().parse().ok();
            continue;
        }

        let cols: Vec<&str> = line.split('|').map(str::trim).collect();
        if cols.len() < 5 {
            continue;
        }
        let Ok(rank) = cols[1].parse::<u32>() else {
            continue;
        };
        let name = cols[2];
        if name.is_empty() {
            continue;
        }
        let usage_perc = cols[3].trim_end_matches('%').parse::<f64>().unwrap_or(0.0);
        let raw_count = cols[4].parse::<u64>().ok();
        entities.insert(
            name.to_string(),
            EntityStats {
                rank: Some(rank),
                usage_perc,
                raw_count,
            },
        );
    }

    UsageDocument {
        total_battles,
        pokemon_data: entities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SnapshotStore;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
 Total battles: 4160
 Avg. weight/team: 0.654
 + ---- + ------------------ + --------- + ------ + ------- + ------ + ------- +
 | Rank | Pokemon            | Usage %   | Raw    | %       | Real   | %       |
 + ---- + ------------------ + --------- + ------ + ------- + ------ + ------- +
 | 1    | Tauros             | 85.43425% | 3455   | 83.234% | 3123   | 80.1%   |
 | 2    | Snorlax            | 60.10000% | 2430   | 58.552% | 2201   | 56.4%   |
 | 3    | Chansey            | 55.00000% | 2224   | 53.589% | 2005   | 51.4%   |
 + ---- + ------------------ + --------- + ------ + ------- + ------ + ------- +
";

    fn period(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn parses_rows_in_rank_order() {
        let doc = parse_usage_table(SAMPLE);
        let names: Vec<&str> = doc.pokemon_data.keys().map(String::as_str).collect();
        assert_eq!(names, ["Tauros", "Snorlax", "Chansey"]);
        assert_eq!(doc.pokemon_data["Tauros"].usage_perc, 85.43425);
        assert_eq!(doc.pokemon_data["Snorlax"].rank, Some(2));
        assert_eq!(doc.pokemon_data["Chansey"].raw_count, Some(2224));
        assert_eq!(doc.total_battles, Some(4160));
    }

    #[test]
    fn header_and_rule_lines_are_ignored() {
        let doc = parse_usage_table(
            " + ---- + ----- +\n | Rank | Pokemon | Usage % | Raw | % |\n + ---- + ----- +\n",
        );
        assert!(doc.pokemon_data.is_empty());
    }

    #[test]
    fn normalized_document_feeds_the_store() {
        let tmp = TempDir::new().unwrap();
        let month_dir = tmp.path().join("2023-01");
        fs::create_dir_all(&month_dir).unwrap();
        fs::write(month_dir.join("usage.txt"), SAMPLE).unwrap();

        normalize_range(tmp.path(), period("2023-01"), period("2023-01")).unwrap();

        let store = SnapshotStore::new(tmp.path());
        let records = store.load(period("2023-01"));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Tauros");
        assert_eq!(records[0].usage_perc, 85.43425);
    }

    #[test]
    fn months_without_raw_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        normalize_range(tmp.path(), period("2023-01"), period("2023-03")).unwrap();
        assert!(!tmp.path().join("2023-01").exists());
    }
}
