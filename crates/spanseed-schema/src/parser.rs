//! Best-effort DDL parser
//!
//! Extracts table and column information from `CREATE TABLE` statements by
//! token scanning, not by a real SQL grammar. Spanner DDL (INTERLEAVE
//! clauses, `ARRAY<STRING(MAX)>`, trailing `PRIMARY KEY`) falls outside the
//! dialects general SQL parsers cover, and the extraction here only needs
//! names and base type keywords. Statements it does not recognize
//! contribute nothing and never fail the parse.

use crate::error::{SchemaError, SchemaResult};
use crate::types::{ColumnType, SchemaMap, TableSchema};
use std::path::Path;

/// Keywords that start a table-level constraint rather than a column line.
const CONSTRAINT_KEYWORDS: &[&str] = &["PRIMARY", "FOREIGN", "CONSTRAINT", "CHECK", "INDEX"];

/// Parse a list of DDL statements into a schema map.
///
/// Non-CREATE TABLE statements (ALTER, CREATE INDEX, ...) are skipped.
pub fn parse_ddl_statements(statements: &[String]) -> SchemaMap {
    let mut schema = SchemaMap::new();

    for stmt in statements {
        if let Some((table, columns)) = parse_create_table(stmt) {
            if columns.is_empty() {
                log::warn!("CREATE TABLE {} yielded no columns, skipping", table);
                continue;
            }
            schema.insert(table, columns);
        }
    }

    schema
}

/// Read all `.sql` files in a directory in lexical filename order and split
/// them into statements. The `NNN_name.sql` numeric-prefix convention sorts
/// naturally under lexical ordering.
pub fn read_ddl_dir(dir: &Path) -> SchemaResult<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::SchemaRead {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("sql")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(SchemaError::NoMigrationFiles {
            path: dir.display().to_string(),
        });
    }

    let mut statements = Vec::new();
    for file in &files {
        let content = std::fs::read_to_string(file).map_err(|e| SchemaError::SchemaRead {
            path: file.display().to_string(),
            message: e.to_string(),
        })?;
        statements.extend(split_statements(&content));
    }

    if statements.is_empty() {
        return Err(SchemaError::NoMigrationFiles {
            path: dir.display().to_string(),
        });
    }

    Ok(statements)
}

/// Read a migration directory and parse it in one step.
pub fn load_schema_from_dir(dir: &Path) -> SchemaResult<SchemaMap> {
    let statements = read_ddl_dir(dir)?;
    Ok(parse_ddl_statements(&statements))
}

/// Split file content into statements on `;`, dropping `--` comment lines.
pub fn split_statements(content: &str) -> Vec<String> {
    let without_comments: String = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extract `(table name, columns)` from one CREATE TABLE statement, or
/// `None` if the statement is anything else.
fn parse_create_table(stmt: &str) -> Option<(String, TableSchema)> {
    let tokens: Vec<&str> = stmt.split_whitespace().collect();

    let create_pos = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("CREATE"))?;
    if !tokens
        .get(create_pos + 1)
        .is_some_and(|t| t.eq_ignore_ascii_case("TABLE"))
    {
        return None;
    }

    // The name is the token after TABLE, skipping past IF NOT EXISTS when
    // present. This is a bare token scan, not a tokenizer: quoted names are
    // handled only by trimming backticks/quotes, and a column list glued to
    // the name ("Users(") is split at the paren.
    let mut name_pos = create_pos + 2;
    if tokens
        .get(name_pos)
        .is_some_and(|t| t.eq_ignore_ascii_case("IF"))
    {
        // Skip IF NOT EXISTS, landing on the token after EXISTS
        name_pos += 3;
    }
    let raw_name = tokens.get(name_pos)?;
    let table = unquote(raw_name.split('(').next().unwrap_or(raw_name));
    if table.is_empty() {
        return None;
    }

    let body = column_body(stmt)?;
    let mut columns = TableSchema::new();
    for segment in split_top_level(body) {
        let mut parts = segment.split_whitespace();
        let first = match parts.next() {
            Some(t) => t,
            None => continue,
        };
        if CONSTRAINT_KEYWORDS
            .iter()
            .any(|kw| first.eq_ignore_ascii_case(kw))
        {
            continue;
        }
        let Some(type_token) = parts.next() else {
            continue;
        };
        let column = unquote(first);
        if column.is_empty() {
            continue;
        }
        columns.insert(column, ColumnType::parse(type_token));
    }

    Some((table, columns))
}

/// The text between the first `(` and its matching `)`. Depth counting
/// keeps type qualifiers like `STRING(36)` inside the body intact.
fn column_body(stmt: &str) -> Option<&str> {
    let start = stmt.find('(')?;
    let mut depth = 0usize;
    for (offset, ch) in stmt[start..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&stmt[start + 1..start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a column body on commas outside parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&body[start..]);
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn unquote(token: &str) -> String {
    token.trim_matches(|c| c == '`' || c == '"' || c == '\'').to_string()
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
