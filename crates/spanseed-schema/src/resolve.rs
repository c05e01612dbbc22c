//! Seed-key to schema-table reconciliation
//!
//! Seed files are written by hand and rarely match table names exactly
//! ("users" vs "Users", "user" vs "Users"). Resolution walks an explicit
//! priority list; the first level with a hit wins, and ties inside a level
//! take the lexicographically smallest table name so resolution is
//! deterministic:
//!
//! 1. exact match
//! 2. case-insensitive match
//! 3. naive plural of the key (+s, y→ies), case-insensitive
//! 4. naive singular of the key (ies→y, strip trailing s), case-insensitive

use crate::types::SchemaMap;

/// Resolve a seed key to an actual schema table name.
pub fn resolve_table_name(seed_key: &str, schema: &SchemaMap) -> Option<String> {
    if schema.contains_key(seed_key) {
        return Some(seed_key.to_string());
    }

    let mut tables: Vec<&String> = schema.keys().collect();
    tables.sort();

    let key_lower = seed_key.to_lowercase();
    if let Some(found) = tables.iter().find(|t| t.to_lowercase() == key_lower) {
        return Some((**found).clone());
    }

    let plural = pluralize(&key_lower);
    if let Some(found) = tables.iter().find(|t| t.to_lowercase() == plural) {
        return Some((**found).clone());
    }

    if let Some(singular) = singularize(&key_lower) {
        if let Some(found) = tables.iter().find(|t| t.to_lowercase() == singular) {
            return Some((**found).clone());
        }
    }

    None
}

fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        format!("{}ies", stem)
    } else if word.ends_with('s') {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

fn singularize(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        Some(format!("{}y", stem))
    } else if let Some(stem) = word.strip_suffix('s') {
        Some(stem.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TableSchema;

    fn schema_of(tables: &[&str]) -> SchemaMap {
        tables
            .iter()
            .map(|t| (t.to_string(), TableSchema::new()))
            .collect()
    }

    #[test]
    fn test_exact_match_wins() {
        let schema = schema_of(&["Users", "users"]);
        assert_eq!(resolve_table_name("users", &schema).as_deref(), Some("users"));
        assert_eq!(resolve_table_name("Users", &schema).as_deref(), Some("Users"));
    }

    #[test]
    fn test_case_insensitive() {
        let schema = schema_of(&["Users"]);
        assert_eq!(resolve_table_name("USERS", &schema).as_deref(), Some("Users"));
    }

    #[test]
    fn test_pluralization() {
        let schema = schema_of(&["Users", "Categories"]);
        assert_eq!(resolve_table_name("user", &schema).as_deref(), Some("Users"));
        assert_eq!(
            resolve_table_name("category", &schema).as_deref(),
            Some("Categories")
        );
    }

    #[test]
    fn test_singularization() {
        let schema = schema_of(&["User"]);
        assert_eq!(resolve_table_name("users", &schema).as_deref(), Some("User"));
    }

    #[test]
    fn test_unresolvable() {
        let schema = schema_of(&["Users"]);
        assert_eq!(resolve_table_name("payments", &schema), None);
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        // Both differ from the key only by case; the smaller name wins
        let schema = schema_of(&["USERS", "Users"]);
        assert_eq!(resolve_table_name("users", &schema).as_deref(), Some("USERS"));
    }
}
