//! Input validation for identifiers and seed paths
//!
//! Table names end up interpolated into `SELECT COUNT(*)` statements, and
//! seed paths come straight from CLI arguments, so both go through an
//! allowlist before use.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Maximum length for a table identifier (Spanner limit)
const MAX_IDENTIFIER_LEN: usize = 128;

/// Default maximum seed file size: 10 MiB
pub const DEFAULT_MAX_SEED_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions accepted for seed and fixture files
pub const SEED_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

fn table_ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid regex"))
}

fn resource_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9-]*[a-z0-9]$").expect("valid regex"))
}

/// Validate a table identifier against the allow-pattern.
///
/// Accepts `Users`; rejects `Users; DROP TABLE Users` and anything else
/// outside `[A-Za-z][A-Za-z0-9_]*`.
pub fn validate_table_identifier(name: &str) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::InvalidIdentifier {
            name: name.to_string(),
            reason: "identifier is empty".to_string(),
            suggestion: "Provide a non-empty table name".to_string(),
        });
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(CoreError::InvalidIdentifier {
            name: name.to_string(),
            reason: format!("identifier exceeds {} characters", MAX_IDENTIFIER_LEN),
            suggestion: "Shorten the table name".to_string(),
        });
    }
    if !table_ident_re().is_match(name) {
        return Err(CoreError::InvalidIdentifier {
            name: name.to_string(),
            reason: "only letters, digits, and underscores are allowed, starting with a letter"
                .to_string(),
            suggestion: format!("Did you mean '{}'?", sanitize_identifier(name)),
        });
    }
    Ok(())
}

/// Escape quoting characters in an identifier before interpolation.
///
/// Validation already rejects these, so this is a second line behind the
/// allow-pattern rather than the primary defense.
pub fn escape_identifier(name: &str) -> String {
    name.replace('`', "\\`").replace('\'', "\\'")
}

/// Validate a project/instance/database id segment.
///
/// Spanner ids are 2-30 characters of lowercase letters, digits, and
/// hyphens, starting with a letter and not ending with a hyphen.
pub fn validate_resource_id(kind: &str, id: &str) -> CoreResult<()> {
    let suggestion = || format!("Did you mean '{}'?", sanitize_resource_id(id));
    if id.len() < 2 || id.len() > 30 {
        return Err(CoreError::InvalidResourceId {
            kind: kind.to_string(),
            id: id.to_string(),
            reason: "must be 2-30 characters".to_string(),
            suggestion: suggestion(),
        });
    }
    if !resource_id_re().is_match(id) {
        return Err(CoreError::InvalidResourceId {
            kind: kind.to_string(),
            id: id.to_string(),
            reason: "only lowercase letters, digits, and hyphens are allowed, starting with a \
                     letter and ending with a letter or digit"
                .to_string(),
            suggestion: suggestion(),
        });
    }
    Ok(())
}

/// Validate a seed/fixture path: it must exist, contain no `..` traversal
/// segments, carry an allowed extension (for files), and stay under the
/// size cap.
pub fn validate_seed_path(path: &Path, max_bytes: u64) -> CoreResult<()> {
    let display = path.display().to_string();

    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(CoreError::PathValidation {
            path: display,
            reason: "path contains '..' traversal segments".to_string(),
            suggestion: "Use a path relative to the project root without '..'".to_string(),
        });
    }

    let meta = std::fs::metadata(path).map_err(|e| CoreError::PathValidation {
        path: display.clone(),
        reason: format!("cannot stat path: {}", e),
        suggestion: "Check that the file or directory exists".to_string(),
    })?;

    if meta.is_file() {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !SEED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(CoreError::PathValidation {
                path: display,
                reason: format!("extension '{}' is not allowed", ext),
                suggestion: format!("Use one of: {}", SEED_EXTENSIONS.join(", ")),
            });
        }
        if meta.len() > max_bytes {
            return Err(CoreError::PathValidation {
                path: display,
                reason: format!("file is {} bytes, cap is {}", meta.len(), max_bytes),
                suggestion: "Split the seed data into smaller scenario files".to_string(),
            });
        }
    }

    Ok(())
}

fn sanitize_identifier(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    match cleaned.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => cleaned,
        _ => format!("T{}", cleaned),
    }
}

fn sanitize_resource_id(id: &str) -> String {
    id.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_table_identifier() {
        assert!(validate_table_identifier("Users").is_ok());
        assert!(validate_table_identifier("user_sessions_2").is_ok());
    }

    #[test]
    fn test_rejects_injection() {
        assert!(validate_table_identifier("Users; DROP TABLE Users").is_err());
        assert!(validate_table_identifier("Users--").is_err());
        assert!(validate_table_identifier("`Users`").is_err());
        assert!(validate_table_identifier("").is_err());
    }

    #[test]
    fn test_rejects_leading_digit() {
        assert!(validate_table_identifier("1users").is_err());
    }

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("Users"), "Users");
        assert_eq!(escape_identifier("a`b"), "a\\`b");
    }

    #[test]
    fn test_resource_id() {
        assert!(validate_resource_id("database", "e2e-test-db").is_ok());
        assert!(validate_resource_id("database", "E2E").is_err());
        assert!(validate_resource_id("database", "x").is_err());
        assert!(validate_resource_id("database", "ends-with-").is_err());
    }

    #[test]
    fn test_resource_id_suggestion() {
        let err = validate_resource_id("database", "My_DB").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("my-db"), "suggestion missing from: {}", msg);
    }

    #[test]
    fn test_path_traversal_rejected() {
        let err = validate_seed_path(&PathBuf::from("../seeds/data.yaml"), 1024).unwrap_err();
        assert!(err.to_string().contains("traversal"));
    }

    #[test]
    fn test_path_extension_and_size() {
        let dir = tempfile::TempDir::new().unwrap();
        let csv = dir.path().join("data.csv");
        std::fs::write(&csv, "a,b\n").unwrap();
        assert!(validate_seed_path(&csv, 1024).is_err());

        let yaml = dir.path().join("data.yaml");
        std::fs::write(&yaml, "Users: {}\n").unwrap();
        assert!(validate_seed_path(&yaml, 1024).is_ok());
        assert!(validate_seed_path(&yaml, 2).is_err());
    }

    #[test]
    fn test_missing_path() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(validate_seed_path(&dir.path().join("absent.yaml"), 1024).is_err());
    }
}
