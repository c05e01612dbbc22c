//! Shared setup for commands: config resolution and manager construction

use crate::cli::GlobalArgs;
use anyhow::{bail, Context, Result};
use spanseed_core::{Config, DatabasePath};
use spanseed_db::{
    ConnectionPool, DatabaseManager, PoolConfig, RestClientFactory, RetryPolicy,
};
use std::path::Path;
use std::sync::Arc;

/// Resolve configuration: config file if given, otherwise CLI/env globals.
/// CLI globals override file values either way.
pub fn resolve_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => {
            let Some(project) = global.project.clone() else {
                bail!(
                    "No project id. Pass --project, set SPANNER_PROJECT_ID, or point --config \
                     at a spanseed.yml"
                );
            };
            let Some(instance) = global.instance.clone() else {
                bail!("No instance id. Pass --instance or set SPANNER_INSTANCE_ID");
            };
            Config {
                project_id: project,
                instance_id: instance,
                emulator_host: None,
                pool: Default::default(),
                retry: Default::default(),
            }
        }
    };

    if global.config.is_some() {
        if let Some(project) = &global.project {
            config.project_id = project.clone();
        }
        if let Some(instance) = &global.instance {
            config.instance_id = instance.clone();
        }
    }
    if let Some(host) = &global.emulator_host {
        config.emulator_host = Some(host.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build the pool and manager for one target database.
pub fn build_manager(
    config: &Config,
    database: &DatabasePath,
) -> Result<(Arc<ConnectionPool>, DatabaseManager)> {
    let factory = Arc::new(
        RestClientFactory::new(config.emulator_host.as_deref())
            .context("Failed to build Spanner client factory")?,
    );
    let pool = Arc::new(ConnectionPool::new(factory, PoolConfig::from(&config.pool)));
    let manager = DatabaseManager::new(Arc::clone(&pool), database.clone())
        .with_database_retry(RetryPolicy::from_settings(&config.retry));
    Ok((pool, manager))
}
