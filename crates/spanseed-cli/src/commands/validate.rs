//! Validate command implementation
//!
//! Prints a per-table pass/fail report. With an expected-state config,
//! listed tables must meet their `min_rows` (default 1) and must exist;
//! without one, a table passes as long as its row count succeeds.

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{build_manager, resolve_config};
use anyhow::{Context, Result};
use serde::Deserialize;
use spanseed_db::TableSummary;
use std::collections::HashMap;
use std::path::Path;

/// Expected-state config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExpectedState {
    #[serde(default)]
    tables: HashMap<String, TableExpectation>,
}

#[derive(Debug, Deserialize)]
struct TableExpectation {
    #[serde(default)]
    min_rows: Option<i64>,
}

impl ExpectedState {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let config = resolve_config(global)?;
    let database = config
        .database_path(&args.database)
        .context("Invalid database id")?;
    let (pool, manager) = build_manager(&config, &database)?;

    let expected = match &args.expected {
        Some(path) => ExpectedState::load(Path::new(path))?,
        None => ExpectedState::default(),
    };

    if global.verbose {
        eprintln!("[verbose] Validating {}", database);
    }

    let summary = manager.table_summary().await.context("Failed to summarize tables")?;
    pool.close().await;

    let failures = report(&summary, &expected);

    println!();
    println!(
        "{} tables, {} total rows, {} failures",
        summary.tables.len(),
        summary.total_rows,
        failures
    );

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Print per-table pass/fail lines and return the failure count.
fn report(summary: &TableSummary, expected: &ExpectedState) -> usize {
    let mut failures = 0;
    let mut seen: Vec<&str> = Vec::new();

    for table in &summary.tables {
        seen.push(&table.table);
        let min_rows = expected
            .tables
            .get(&table.table)
            .map(|e| e.min_rows.unwrap_or(1));

        match (table.rows, min_rows) {
            (Some(rows), Some(min)) if rows < min => {
                failures += 1;
                println!(
                    "  ✗ {} - expected at least {} rows, found {}",
                    table.table, min, rows
                );
            }
            (Some(rows), _) => {
                println!("  ✓ {} ({} rows)", table.table, rows);
            }
            (None, _) => {
                failures += 1;
                println!(
                    "  ✗ {} - {}",
                    table.table,
                    table.error.as_deref().unwrap_or("row count failed")
                );
            }
        }
    }

    // Expected tables the database does not have at all
    let mut missing: Vec<&String> = expected
        .tables
        .keys()
        .filter(|name| !seen.contains(&name.as_str()))
        .collect();
    missing.sort();
    for name in missing {
        failures += 1;
        println!("  ✗ {} - table not found in database", name);
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use spanseed_db::TableCount;

    fn summary(tables: Vec<TableCount>) -> TableSummary {
        let total_rows = tables.iter().filter_map(|t| t.rows).sum();
        TableSummary { tables, total_rows }
    }

    fn counted(table: &str, rows: i64) -> TableCount {
        TableCount {
            table: table.to_string(),
            rows: Some(rows),
            error: None,
        }
    }

    fn errored(table: &str) -> TableCount {
        TableCount {
            table: table.to_string(),
            rows: None,
            error: Some("boom".to_string()),
        }
    }

    fn expectations(pairs: &[(&str, Option<i64>)]) -> ExpectedState {
        ExpectedState {
            tables: pairs
                .iter()
                .map(|(name, min_rows)| {
                    (name.to_string(), TableExpectation { min_rows: *min_rows })
                })
                .collect(),
        }
    }

    #[test]
    fn test_no_expectations_passes_on_counts() {
        let s = summary(vec![counted("Users", 0), counted("Orders", 3)]);
        assert_eq!(report(&s, &ExpectedState::default()), 0);
    }

    #[test]
    fn test_count_error_fails() {
        let s = summary(vec![counted("Users", 1), errored("Orders")]);
        assert_eq!(report(&s, &ExpectedState::default()), 1);
    }

    #[test]
    fn test_min_rows_default_is_one() {
        let s = summary(vec![counted("Users", 0)]);
        let expected = expectations(&[("Users", None)]);
        assert_eq!(report(&s, &expected), 1);
    }

    #[test]
    fn test_min_rows_met() {
        let s = summary(vec![counted("Users", 5)]);
        let expected = expectations(&[("Users", Some(5))]);
        assert_eq!(report(&s, &expected), 0);
    }

    #[test]
    fn test_expected_table_missing_from_database() {
        let s = summary(vec![counted("Users", 5)]);
        let expected = expectations(&[("Users", Some(1)), ("Payments", Some(1))]);
        assert_eq!(report(&s, &expected), 1);
    }

    #[test]
    fn test_expected_state_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("expected.yaml");
        std::fs::write(
            &path,
            "tables:\n  Users:\n    min_rows: 2\n  Orders: {}\n",
        )
        .unwrap();

        let expected = ExpectedState::load(&path).unwrap();
        assert_eq!(expected.tables["Users"].min_rows, Some(2));
        assert_eq!(expected.tables["Orders"].min_rows, None);
    }
}
