use thiserror::Error;

/// Errors produced while preparing or using the database handle.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Required builder parameters were missing or malformed.
    #[error("invalid database configuration: {0}")]
    Validation(String),

    /// An error surfaced by the underlying sqlx driver.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
