//! Seed command implementation

use crate::cli::{GlobalArgs, SeedArgs};
use crate::commands::common::{build_manager, resolve_config};
use anyhow::{Context, Result};
use spanseed_ingest::{
    count_by_table, AutoMutationBuilder, FixtureDirSource, SeedFileSource, SeedSource,
};
use std::path::Path;

/// Execute the seed command
pub async fn execute(args: &SeedArgs, global: &GlobalArgs) -> Result<()> {
    let config = resolve_config(global)?;
    let database = config
        .database_path(&args.database)
        .context("Invalid database id")?;
    let (pool, manager) = build_manager(&config, &database)?;

    // Clap guarantees exactly one source is set
    let source: Box<dyn SeedSource> = match (&args.file, &args.fixtures) {
        (Some(file), _) => Box::new(SeedFileSource::new(file)),
        (_, Some(dir)) => Box::new(FixtureDirSource::new(dir)),
        _ => unreachable!("clap enforces a seed source"),
    };

    if global.verbose {
        eprintln!("[verbose] Loading {}", source.describe());
        eprintln!("[verbose] Target database: {}", database);
    }

    let seed_data = source
        .load()
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    let schema = manager
        .load_schema(args.schema_dir.as_deref().map(Path::new))
        .await
        .context("Failed to load schema")?;
    if global.verbose {
        eprintln!("[verbose] Schema covers {} tables", schema.len());
    }

    let builder = AutoMutationBuilder::new(schema);
    let mutations = builder.build_from_seed_data(&seed_data);

    if mutations.is_empty() {
        println!("No usable seed rows found in {}.", source.describe());
        pool.close().await;
        return Ok(());
    }

    let counts = count_by_table(&mutations);
    println!("Seeding {} rows into {}...\n", mutations.len(), args.database);

    match manager.apply_mutations(&mutations).await {
        Ok(applied) => {
            for (table, rows) in &counts {
                println!("  ✓ {} ({} rows)", table, rows);
            }
            println!();
            println!("Seeded {} rows across {} tables", applied, counts.len());
            pool.close().await;
            Ok(())
        }
        Err(e) => {
            for (table, rows) in &counts {
                println!("  ✗ {} ({} rows)", table, rows);
            }
            println!();
            println!("Seeding failed: {}", e);
            pool.close().await;
            // Exit code 4 = database error, so orchestration can tell
            // injection failures from validation failures
            std::process::exit(4);
        }
    }
}
