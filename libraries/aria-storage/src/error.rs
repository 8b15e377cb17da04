/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The persisted schema is newer than this binary understands
    #[error("server binary outdated, please upgrade it to handle this database (database version {db_version}, supported up to {supported})")]
    BinaryOutdated { db_version: i64, supported: i64 },

    /// The persisted schema predates the oldest supported migration
    #[error("database outdated, please rebuild it (database version {db_version}, oldest supported {oldest_supported})")]
    DatabaseOutdated {
        db_version: i64,
        oldest_supported: i64,
    },

    /// The migration step table has a hole in it
    #[error("migration chain is not contiguous: expected step for version {expected}, found {found}")]
    MigrationGap { expected: i64, found: i64 },

    /// Serialization/deserialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}
