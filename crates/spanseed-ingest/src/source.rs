//! Seed-data sources
//!
//! Two seeding strategies coexist for different project generations: a
//! single structured seed file (table → row or list-of-rows) and a fixture
//! directory with one file per table. Both are adapters producing the same
//! `SeedData`, so everything downstream of loading is shared.

use crate::error::{IngestError, IngestResult};
use spanseed_core::validation::{validate_seed_path, DEFAULT_MAX_SEED_BYTES, SEED_EXTENSIONS};
use spanseed_core::value::SeedValue;
use spanseed_core::SeedData;
use std::path::{Path, PathBuf};

/// A source of seed data.
pub trait SeedSource {
    /// Load and parse the seed data, preserving input order.
    fn load(&self) -> IngestResult<SeedData>;

    /// Human-readable description for reports.
    fn describe(&self) -> String;
}

/// One YAML/JSON file mapping seed keys to a row or a list of rows.
pub struct SeedFileSource {
    path: PathBuf,
    max_bytes: u64,
}

impl SeedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: DEFAULT_MAX_SEED_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl SeedSource for SeedFileSource {
    fn load(&self) -> IngestResult<SeedData> {
        validate_seed_path(&self.path, self.max_bytes)?;
        let content = read_source(&self.path)?;
        parse_seed_document(&self.path, &content)
    }

    fn describe(&self) -> String {
        format!("seed file {}", self.path.display())
    }
}

/// A directory of per-table fixture files: filename stem = seed key, file
/// contents = one row or a list of rows. Files load in lexical filename
/// order.
pub struct FixtureDirSource {
    dir: PathBuf,
    max_bytes: u64,
}

impl FixtureDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: DEFAULT_MAX_SEED_BYTES,
        }
    }
}

impl SeedSource for FixtureDirSource {
    fn load(&self) -> IngestResult<SeedData> {
        validate_seed_path(&self.dir, self.max_bytes)?;

        let entries = std::fs::read_dir(&self.dir).map_err(|e| IngestError::SeedRead {
            path: self.dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .map(|e| SEED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                        .unwrap_or(false)
            })
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(IngestError::EmptyFixtureDir {
                path: self.dir.display().to_string(),
            });
        }

        let mut seed_data = SeedData::new();
        for file in &files {
            validate_seed_path(file, self.max_bytes)?;
            let Some(key) = file.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("fixture file {} has no usable name, skipping", file.display());
                continue;
            };
            let content = read_source(file)?;
            let doc: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| IngestError::SeedParse {
                    path: file.display().to_string(),
                    message: e.to_string(),
                })?;
            seed_data.push((key.to_string(), SeedValue::from_yaml(&doc)));
        }

        Ok(seed_data)
    }

    fn describe(&self) -> String {
        format!("fixture directory {}", self.dir.display())
    }
}

fn read_source(path: &Path) -> IngestResult<String> {
    std::fs::read_to_string(path).map_err(|e| IngestError::SeedRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Parse a seed document: the top level must be a mapping from seed key to
/// rows. YAML is a superset of JSON, so one parser covers both formats.
fn parse_seed_document(path: &Path, content: &str) -> IngestResult<SeedData> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| IngestError::SeedParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    match SeedValue::from_yaml(&doc) {
        SeedValue::Map(pairs) => Ok(pairs),
        other => Err(IngestError::SeedParse {
            path: path.display().to_string(),
            message: format!("top level is a {}, expected a mapping", other.type_name()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_file_yaml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scenario.yaml");
        std::fs::write(
            &path,
            r#"
Users:
  - UserID: u1
    Name: A
  - UserID: u2
Orders:
  OrderID: o1
"#,
        )
        .unwrap();

        let data = SeedFileSource::new(&path).load().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].0, "Users");
        assert_eq!(data[1].0, "Orders");
        match &data[0].1 {
            SeedValue::List(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_seed_file_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(&path, r#"{"Users": [{"UserID": "u1"}]}"#).unwrap();

        let data = SeedFileSource::new(&path).load().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].0, "Users");
    }

    #[test]
    fn test_seed_file_rejects_non_mapping() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "- just\n- a\n- list\n").unwrap();

        let err = SeedFileSource::new(&path).load().unwrap_err();
        assert!(matches!(err, IngestError::SeedParse { .. }));
    }

    #[test]
    fn test_seed_file_size_cap() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("big.yaml");
        std::fs::write(&path, "Users: {}\n").unwrap();

        let err = SeedFileSource::new(&path).with_max_bytes(2).load().unwrap_err();
        assert!(matches!(err, IngestError::Core(_)));
    }

    #[test]
    fn test_fixture_dir_lexical_order_and_equivalence() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("Users.yaml"), "- UserID: u1\n- UserID: u2\n").unwrap();
        std::fs::write(dir.path().join("Orders.yaml"), "OrderID: o1\n").unwrap();
        std::fs::write(dir.path().join("README.md"), "not a fixture").unwrap();

        let data = FixtureDirSource::new(dir.path()).load().unwrap();
        assert_eq!(data.len(), 2);
        // Lexical order: Orders before Users
        assert_eq!(data[0].0, "Orders");
        assert_eq!(data[1].0, "Users");

        // Equivalent seed-file content produces the same SeedData modulo order
        let seed_path = dir.path().join("combined.yaml");
        std::fs::write(
            &seed_path,
            "Orders:\n  OrderID: o1\nUsers:\n  - UserID: u1\n  - UserID: u2\n",
        )
        .unwrap();
        let from_file = SeedFileSource::new(&seed_path).load().unwrap();
        // combined.yaml is itself picked up by a rescan, so compare against
        // the original two entries only
        assert_eq!(from_file[0], data[0]);
        assert_eq!(from_file[1], data[1]);
    }

    #[test]
    fn test_fixture_dir_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let err = FixtureDirSource::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, IngestError::EmptyFixtureDir { .. }));
    }

    #[test]
    fn test_describe() {
        assert!(SeedFileSource::new("a.yaml").describe().contains("a.yaml"));
        assert!(FixtureDirSource::new("fixtures").describe().contains("fixtures"));
    }
}
