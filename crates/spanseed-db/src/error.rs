//! Error types for spanseed-db

use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    /// D001: Client connection failed
    #[error("[D001] Connection failed for {database}: {message}")]
    Connection { database: String, message: String },

    /// D002: Session create/delete failed
    #[error("[D002] Session error: {0}")]
    Session(String),

    /// D003: Statement or commit execution failed
    #[error("[D003] Execution failed: {0}")]
    Execution(String),

    /// D004: Response was not in the expected shape
    #[error("[D004] Failed to decode response: {0}")]
    Decode(String),

    /// D005: Row already exists (idempotent re-seeding treats this as success)
    #[error("[D005] Row already exists: {0}")]
    AlreadyExists(String),

    /// D006: Transient store error, safe to retry
    #[error("[D006] Transient store error ({status}): {message}")]
    Transient { status: String, message: String },

    /// D007: HTTP transport failure
    #[error("[D007] Transport error: {0}")]
    Transport(String),

    /// D008: Pool is full and nothing is evictable
    #[error("[D008] Connection pool exhausted ({max} connections, none evictable)")]
    PoolExhausted { max: usize },

    /// D009: Connection failed its health check
    #[error("[D009] Connection failed health check: {0}")]
    Unhealthy(String),

    /// D010: Retry budget exhausted
    #[error("[D010] Operation '{operation}' failed after {attempts} attempts: {source}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        source: Box<DbError>,
    },

    /// D011: Operation cancelled by shutdown signal
    #[error("[D011] Operation '{0}' cancelled")]
    Cancelled(String),

    /// Core validation/configuration error
    #[error(transparent)]
    Core(#[from] spanseed_core::CoreError),

    /// Schema extraction error
    #[error(transparent)]
    Schema(#[from] spanseed_schema::SchemaError),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

/// gRPC-style status strings the store reports for retryable conditions.
const RETRYABLE_STATUSES: &[&str] = &[
    "UNAVAILABLE",
    "RESOURCE_EXHAUSTED",
    "DEADLINE_EXCEEDED",
    "INTERNAL",
    "ABORTED",
];

impl DbError {
    /// Whether a retry with backoff can reasonably succeed.
    ///
    /// Cancellation is never retryable; unknown errors are fatal by
    /// default.
    pub fn is_retryable(&self) -> bool {
        match self {
            DbError::Transient { .. } | DbError::Transport(_) | DbError::Connection { .. } => true,
            DbError::Cancelled(_) => false,
            _ => false,
        }
    }

    /// Map a REST error payload (HTTP code plus google.rpc status string)
    /// to a `DbError`.
    pub fn from_status(http_code: u16, status: &str, message: String) -> DbError {
        if status == "ALREADY_EXISTS" || http_code == 409 {
            return DbError::AlreadyExists(message);
        }
        if RETRYABLE_STATUSES.contains(&status)
            || matches!(http_code, 429 | 500 | 503 | 504)
        {
            let status = if status.is_empty() {
                http_code.to_string()
            } else {
                status.to_string()
            };
            return DbError::Transient { status, message };
        }
        DbError::Execution(format!("{} ({})", message, status))
    }
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        DbError::Transport(err.to_string())
    }
}
