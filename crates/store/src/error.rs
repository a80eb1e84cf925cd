use thiserror::Error;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored record failed to decode into its domain type.
    #[error("corrupt record: {0}")]
    Decode(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
