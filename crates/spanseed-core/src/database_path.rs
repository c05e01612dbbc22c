//! Strongly-typed database path wrapper.

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_resource_id;
use std::fmt;

/// Fully-qualified Spanner database identity:
/// `projects/{project}/instances/{instance}/databases/{database}`.
///
/// Each segment is validated on construction, so a `DatabasePath` in hand is
/// always safe to embed in a request URL. Also used as the connection-pool
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabasePath {
    project: String,
    instance: String,
    database: String,
}

impl DatabasePath {
    /// Create a new path from its three id segments, validating each.
    pub fn new(
        project: impl Into<String>,
        instance: impl Into<String>,
        database: impl Into<String>,
    ) -> CoreResult<Self> {
        let project = project.into();
        let instance = instance.into();
        let database = database.into();
        validate_resource_id("project", &project)?;
        validate_resource_id("instance", &instance)?;
        validate_resource_id("database", &database)?;
        Ok(Self {
            project,
            instance,
            database,
        })
    }

    /// Parse a full `projects/p/instances/i/databases/d` path.
    pub fn parse(path: &str) -> CoreResult<Self> {
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            ["projects", p, "instances", i, "databases", d] => Self::new(*p, *i, *d),
            _ => Err(CoreError::ConfigInvalid {
                message: format!(
                    "'{}' is not a projects/<p>/instances/<i>/databases/<d> path",
                    path
                ),
            }),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}
