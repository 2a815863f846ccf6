//! # Cache Infrastructure
//!
//! A process-shared handle to the key-value store used for sessions and
//! ephemeral data (click counters, short-lived tokens).
//!
//! The production backend is Redis via [`redis::aio::ConnectionManager`]; the
//! manager multiplexes one connection and reconnects on failure, so handlers
//! can clone the handle freely. Connecting is **eager**: an unreachable host
//! fails `init` and thereby the whole bootstrap, which is the intended
//! fail-fast behavior for one-shot initialization.
//!
//! An in-memory backend with the same surface exists for tests and cache-less
//! development environments; see [`Cache::in_memory`].
//!
//! Keys are namespaced by a configurable prefix so several deployments can
//! share one Redis database.

mod error;
mod memory;

pub use error::CacheError;

use memory::MemoryStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEFAULT_PORT: u16 = 6379;
const DEFAULT_KEY_PREFIX: &str = "pressroom";

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Memory(MemoryStore),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis(_) => f.write_str("Backend::Redis(<ConnectionManager>)"),
            Self::Memory(_) => f.write_str("Backend::Memory"),
        }
    }
}

/// A cloneable handle to the cache store.
#[derive(Debug, Clone)]
pub struct Cache {
    backend: Backend,
    prefix: Arc<str>,
}

impl Cache {
    /// Creates a new [`CacheBuilder`] for a Redis-backed cache.
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    /// Creates a cache backed by process memory.
    ///
    /// Behaves like the Redis backend for the operations the platform uses,
    /// without any external service. Intended for tests and development.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { backend: Backend::Memory(MemoryStore::default()), prefix: DEFAULT_KEY_PREFIX.into() }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }

    /// Stores `value` under `key` with a time-to-live.
    ///
    /// # Errors
    /// Returns [`CacheError::Redis`] if the command fails.
    pub async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let key = self.full_key(key);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let () = conn.set_ex(key, value, ttl.as_secs()).await?;
            }
            Backend::Memory(store) => store.set_ex(&key, value, ttl),
        }
        Ok(())
    }

    /// Fetches the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`CacheError::Redis`] if the command fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let key = self.full_key(key);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                Ok(conn.get(key).await?)
            }
            Backend::Memory(store) => Ok(store.get(&key)),
        }
    }

    /// Removes `key` from the store. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns [`CacheError::Redis`] if the command fails.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let key = self.full_key(key);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let () = conn.del(key).await?;
            }
            Backend::Memory(store) => store.delete(&key),
        }
        Ok(())
    }

    /// Atomically increments the integer counter at `key`, returning the new
    /// value. Missing keys count from zero.
    ///
    /// # Errors
    /// Returns [`CacheError::Redis`] if the command fails.
    pub async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let key = self.full_key(key);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                Ok(conn.incr(key, 1_i64).await?)
            }
            Backend::Memory(store) => Ok(store.incr(&key)),
        }
    }
}

/// A fluent builder for connecting the Redis-backed cache handle.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct CacheBuilder {
    host: Option<String>,
    port: Option<u16>,
    db: Option<u8>,
    key_prefix: Option<String>,
}

impl CacheBuilder {
    /// Creates a new [`CacheBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Redis host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the Redis port (defaults to 6379).
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Selects the Redis logical database (defaults to 0).
    pub const fn db(mut self, db: u8) -> Self {
        self.db = Some(db);
        self
    }

    /// Sets the namespace prepended to every key.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Consumes the builder and connects to Redis.
    ///
    /// The connection manager performs an initial handshake, so an
    /// unreachable or misconfigured host fails here rather than on first use.
    ///
    /// # Errors
    /// * [`CacheError::Validation`] if the host is missing.
    /// * [`CacheError::Redis`] if the connection cannot be established.
    pub async fn init(self) -> Result<Cache, CacheError> {
        let host =
            self.host.ok_or_else(|| CacheError::Validation("host is required".to_owned()))?;
        let port = self.port.unwrap_or(DEFAULT_PORT);
        let db = self.db.unwrap_or_default();
        let prefix = self.key_prefix.unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_owned());

        let url = format!("redis://{host}:{port}/{db}");
        let client = redis::Client::open(url.as_str())?;
        let conn = client.get_connection_manager().await?;

        info!(%host, port, db, "Cache store connection established");

        Ok(Cache { backend: Backend::Redis(conn), prefix: prefix.into() })
    }
}
