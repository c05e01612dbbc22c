//! Mutation building from seed data
//!
//! `build_insert` handles one row against one table schema; the
//! `AutoMutationBuilder` drives it across a whole seed document, resolving
//! seed keys to schema tables and tolerating rows and keys it cannot use.

use crate::convert::convert_value;
use spanseed_core::value::SeedValue;
use spanseed_core::{Mutation, SeedData};
use spanseed_schema::{resolve_table_name, SchemaMap, TableSchema};

/// Build a single insert mutation for one seed row.
///
/// Column order is deterministic: schema-declared columns sorted
/// lexicographically, filtered to those present in the record. Columns the
/// schema does not declare are dropped with a warning; absent columns are
/// omitted, never null-filled. Returns `None` when nothing in the row maps
/// to a schema column.
pub fn build_insert(
    table: &str,
    schema: &TableSchema,
    record: &[(String, SeedValue)],
) -> Option<Mutation> {
    for (column, _) in record {
        if !schema.contains_key(column) {
            log::warn!(
                "{}: seed column '{}' is not in the schema, dropping it",
                table,
                column
            );
        }
    }

    let mut declared: Vec<&String> = schema.keys().collect();
    declared.sort();

    let mut columns = Vec::new();
    let mut values = Vec::new();
    for column in declared {
        let Some((_, raw)) = record.iter().find(|(name, _)| name == column) else {
            continue;
        };
        columns.push(column.clone());
        values.push(convert_value(table, column, raw, &schema[column]));
    }

    if columns.is_empty() {
        log::warn!("{}: seed row has no usable columns, skipping", table);
        return None;
    }

    match Mutation::insert(table, columns, values) {
        Ok(mutation) => Some(mutation),
        Err(e) => {
            log::warn!("{}: failed to build mutation: {}", table, e);
            None
        }
    }
}

/// Builds insert mutations for arbitrary seed data against an extracted
/// schema map.
pub struct AutoMutationBuilder {
    schema: SchemaMap,
}

impl AutoMutationBuilder {
    pub fn new(schema: SchemaMap) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    /// Build one mutation per usable seed row, in seed-input order.
    ///
    /// Seed keys that resolve to no schema table, and table values that are
    /// neither a mapping (one row) nor a list of mappings (many rows), are
    /// skipped with a warning. Empty input produces an empty output, never
    /// an error.
    pub fn build_from_seed_data(&self, seed_data: &SeedData) -> Vec<Mutation> {
        let mut mutations = Vec::new();

        for (seed_key, rows) in seed_data {
            let Some(table) = resolve_table_name(seed_key, &self.schema) else {
                log::warn!(
                    "seed key '{}' does not match any schema table, skipping",
                    seed_key
                );
                continue;
            };
            let Some(schema) = self.schema.get(&table) else {
                // resolve_table_name only returns known tables, but stay
                // tolerant if the schema map changed underneath us
                log::warn!("table '{}' missing from schema map, skipping", table);
                continue;
            };

            match rows {
                SeedValue::Map(record) => {
                    mutations.extend(build_insert(&table, schema, record));
                }
                SeedValue::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        match item {
                            SeedValue::Map(record) => {
                                mutations.extend(build_insert(&table, schema, record));
                            }
                            other => {
                                log::warn!(
                                    "{}: row {} is a {}, expected a mapping, skipping",
                                    table,
                                    index,
                                    other.type_name()
                                );
                            }
                        }
                    }
                }
                other => {
                    log::warn!(
                        "seed key '{}' holds a {}, expected a mapping or list of mappings, skipping",
                        seed_key,
                        other.type_name()
                    );
                }
            }
        }

        mutations
    }
}

/// Group built mutations by table for reporting: (table, row count) in
/// first-seen order.
pub fn count_by_table(mutations: &[Mutation]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for mutation in mutations {
        match counts.iter_mut().find(|(t, _)| t == mutation.table()) {
            Some((_, n)) => *n += 1,
            None => counts.push((mutation.table().to_string(), 1)),
        }
    }
    counts
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
