//! Configuration types and parsing for spanseed.yml
//!
//! Configuration comes from an optional YAML project file plus environment
//! variables; CLI flags override both. Required settings are the project and
//! instance ids; everything else has defaults tuned for the emulator.

use crate::error::{CoreError, CoreResult};
use crate::database_path::DatabasePath;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration from spanseed.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Google Cloud project id (env: SPANNER_PROJECT_ID)
    pub project_id: String,

    /// Spanner instance id (env: SPANNER_INSTANCE_ID)
    pub instance_id: String,

    /// Emulator host:port (env: SPANNER_EMULATOR_HOST). When unset, the
    /// public Spanner endpoint is used.
    #[serde(default)]
    pub emulator_host: Option<String>,

    /// Connection pool tuning
    #[serde(default)]
    pub pool: PoolSettings,

    /// Retry/backoff tuning for durable operations
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Connection pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum live connections across all databases
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Idle connections older than this are evicted by cleanup
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Connections older than this are evicted regardless of idleness
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,

    /// Background cleanup interval
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Per-acquisition health check timeout
    #[serde(default = "default_health_check_timeout_secs")]
    pub health_check_timeout_secs: u64,
}

/// Retry settings for the "database" profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Jitter fraction in [0, 1): each delay is perturbed by up to this
    /// fraction in either direction
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_max_connections() -> usize {
    10
}

fn default_idle_timeout_secs() -> u64 {
    300
}

fn default_max_lifetime_secs() -> u64 {
    600
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_health_check_timeout_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    250
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.25
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            idle_timeout_secs: default_idle_timeout_secs(),
            max_lifetime_secs: default_max_lifetime_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            health_check_timeout_secs: default_health_check_timeout_secs(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from environment variables alone.
    ///
    /// # Environment Variables
    /// - `SPANNER_PROJECT_ID` (falls back to `GOOGLE_CLOUD_PROJECT`): required
    /// - `SPANNER_INSTANCE_ID`: required
    /// - `SPANNER_EMULATOR_HOST`: optional
    /// - `SPANSEED_MAX_CONNECTIONS`: optional pool override
    pub fn from_env() -> CoreResult<Self> {
        let project_id = std::env::var("SPANNER_PROJECT_ID")
            .or_else(|_| std::env::var("GOOGLE_CLOUD_PROJECT"))
            .map_err(|_| CoreError::ConfigInvalid {
                message: "SPANNER_PROJECT_ID (or GOOGLE_CLOUD_PROJECT) is not set".to_string(),
            })?;
        let instance_id =
            std::env::var("SPANNER_INSTANCE_ID").map_err(|_| CoreError::ConfigInvalid {
                message: "SPANNER_INSTANCE_ID is not set".to_string(),
            })?;
        let emulator_host = std::env::var("SPANNER_EMULATOR_HOST").ok();

        let mut pool = PoolSettings::default();
        if let Some(n) = std::env::var("SPANSEED_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            pool.max_connections = n;
        }

        let config = Self {
            project_id,
            instance_id,
            emulator_host,
            pool,
            retry: RetrySettings::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the rest of the system assumes.
    pub fn validate(&self) -> CoreResult<()> {
        crate::validation::validate_resource_id("project", &self.project_id)?;
        crate::validation::validate_resource_id("instance", &self.instance_id)?;
        if self.pool.max_connections == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "pool.max_connections must be at least 1".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "retry.max_attempts must be at least 1".to_string(),
            });
        }
        if self.retry.multiplier < 1.0 {
            return Err(CoreError::ConfigInvalid {
                message: "retry.multiplier must be >= 1.0".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.retry.jitter) {
            return Err(CoreError::ConfigInvalid {
                message: "retry.jitter must be in [0, 1)".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the full database path for a database id under this
    /// project/instance.
    pub fn database_path(&self, database_id: &str) -> CoreResult<DatabasePath> {
        DatabasePath::new(&self.project_id, &self.instance_id, database_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config {
            project_id: "test-project".to_string(),
            instance_id: "test-instance".to_string(),
            emulator_host: None,
            pool: PoolSettings::default(),
            retry: RetrySettings::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let pool = PoolSettings::default();
        assert_eq!(pool.max_connections, 10);
        assert_eq!(pool.idle_timeout_secs, 300);
        assert_eq!(pool.max_lifetime_secs, 600);
        assert_eq!(pool.cleanup_interval_secs, 60);
        assert_eq!(pool.health_check_timeout_secs, 5);

        let retry = RetrySettings::default();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.initial_delay_ms, 250);
        assert_eq!(retry.max_delay_ms, 10_000);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("spanseed.yml");
        std::fs::write(
            &path,
            r#"
project_id: e2e-project
instance_id: e2e-instance
emulator_host: "localhost:9020"
pool:
  max_connections: 4
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.project_id, "e2e-project");
        assert_eq!(config.pool.max_connections, 4);
        // Unspecified pool fields keep their defaults
        assert_eq!(config.pool.idle_timeout_secs, 300);
        assert_eq!(config.emulator_host.as_deref(), Some("localhost:9020"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = minimal();
        config.pool.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = minimal();
        config.retry.jitter = 1.5;
        assert!(config.validate().is_err());

        let mut config = minimal();
        config.project_id = "Bad_Project".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path() {
        let config = minimal();
        let path = config.database_path("scenario-db").unwrap();
        assert_eq!(
            path.to_string(),
            "projects/test-project/instances/test-instance/databases/scenario-db"
        );
        assert!(config.database_path("Bad DB").is_err());
    }
}
