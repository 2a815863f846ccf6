use thiserror::Error;

/// Errors produced while connecting to or using the cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Required builder parameters were missing or malformed.
    #[error("invalid cache configuration: {0}")]
    Validation(String),

    /// An error surfaced by the Redis client.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
