//! # Pressroom Server
//!
//! Turns a deployment profile into a fully wired, running application:
//! database handle, cache store, route groups, and the HTTP listener.
//!
//! ## Example
//! ```no_run
//! use press_server::Server;
//! use pressroom::domain::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .config(AppConfig::development())
//!         .port(8000)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use press_cache::Cache;
use press_db::Database;
use pressroom::domain::config::AppConfig;
use pressroom::kernel::server::AppState;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
    cache: Option<Cache>,
}

impl ServerBuilder {
    /// Sets the deployment profile the server is built from.
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Overrides the listening port from the profile.
    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Injects a pre-built cache handle instead of connecting to Redis.
    ///
    /// Used by tests and cache-less development setups together with
    /// [`Cache::in_memory`].
    pub fn cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn init_database(&self) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        Database::builder()
            .url(&db_cfg.url)
            .max_connections(db_cfg.max_connections)
            .acquire_timeout(Duration::from_secs(db_cfg.acquire_timeout_seconds))
            .connect_lazy()
            .context("Failed to prepare the database handle")
    }

    async fn init_cache(&self) -> Result<Cache> {
        let redis = &self.cfg.redis;
        Cache::builder()
            .host(&redis.host)
            .port(redis.port)
            .db(redis.db)
            .key_prefix(&redis.key_prefix)
            .init()
            .await
            .context("Failed to connect to the cache store")
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Prepares the lazy database handle (validated, not connected)
    /// 2. Connects the cache store (fail-fast)
    /// 3. Initializes every route group in registration order
    /// 4. Finalizes the application state
    ///
    /// # Errors
    /// Returns an error if the database URL is invalid, the cache store is
    /// unreachable, or any route group fails to initialize. Nothing is served
    /// from a partially built application.
    pub async fn build(self) -> Result<Server> {
        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, "Initializing server");

        let db = self.init_database()?;
        let cache = match self.cache {
            Some(cache) => cache,
            None => self.init_cache().await?,
        };

        let groups = pressroom::init(&self.cfg)
            .map_err(|e| anyhow!("Route group bootstrap failed: {e}"))?;

        let state = AppState::builder()
            .config(self.cfg)
            .db(db)
            .cache(cache)
            .register_groups(groups)
            .build()
            .context("Failed to finalize application state")?;

        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: AppState,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Builds the complete router without binding a listener.
    ///
    /// This is the seam integration tests drive requests through.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        router::init(self.state.clone())
    }

    /// Starts the server and runs until a shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the listener cannot bind to the configured
    /// address.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        let app = self.router();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(30)));
        });

        info!("Starting HTTP server on http://{address}");

        axum_server::bind(address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
