//! # Logger
//!
//! A centralized logging utility for the platform. It configures console and
//! file logging behind a single builder, with non-blocking I/O and
//! environment-based filtering.
//!
//! File output uses **size-capped rotation**: each file holds at most
//! `max_bytes` (100 MiB by default) and at most `max_backups` rotated files
//! (10 by default) are kept, so disk usage is bounded no matter how chatty the
//! process becomes.
//!
//! Initialization installs the global tracing subscriber and therefore may
//! happen only once per process; a second call fails with
//! [`LoggerError::Subscriber`] instead of stacking duplicate outputs.
//!
//! ## Example
//!
//! ```rust
//! # use press_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;
mod rolling;

pub use crate::error::LoggerError;
pub use tracing::level_filters::LevelFilter;

use crate::rolling::SizeRollingWriter;
use private::Sealed;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;
const DEFAULT_MAX_BACKUPS: usize = 10;

#[derive(Debug)]
pub struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    max_bytes: u64,
    max_backups: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            max_bytes: DEFAULT_MAX_BYTES,
            max_backups: DEFAULT_MAX_BACKUPS,
            json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring and initializing the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: std::marker::PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name of the logger, used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder {
            name: WithName(name.into()),
            config: self.config,
            file_state: std::marker::PhantomData,
        }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Caps the size of each log file. The active file rotates before it
    /// would grow past this many bytes.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_bytes(mut self, max: u64) -> Self {
        self.config.max_bytes = max;
        self
    }

    /// Configures the maximum number of rotated backup files to keep.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_backups(mut self, max: usize) -> Self {
        self.config.max_backups = max;
        self
    }

    /// Enables JSON output for the file layer.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `press=debug,hyper=info`).
    ///
    /// Environment variables still override via `RUST_LOG`; this is a
    /// programmatic default. Invalid filters cause [`LoggerBuilder::init`] to
    /// return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables console logging.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Sets the directory to write log files into.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: std::marker::PhantomData }
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. **Note:** This handle contains a [`WorkerGuard`]
    /// that must be kept alive for the duration of the program to ensure
    /// that non-blocking logs are flushed correctly.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already
    /// been set, [`LoggerError::Io`] if the log directory cannot be prepared,
    /// and [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        validate_config(&self.config, &self.name.0)?;

        let env_filter = build_env_filter(&self.config)?;

        let mut layers = Vec::new();

        if self.config.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = if let Some(path) = self.config.path {
            let writer = SizeRollingWriter::new(
                &path,
                &self.name.0,
                self.config.max_bytes,
                self.config.max_backups,
            )
            .map_err(|source| LoggerError::Io { path: path.clone(), source })?;

            let (non_blocking, g) = tracing_appender::non_blocking(writer);

            let file_layer = layer().with_writer(non_blocking).with_ansi(false);

            let boxed =
                if self.config.json { file_layer.json().boxed() } else { file_layer.boxed() };

            layers.push(boxed);
            Some(g)
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration(
                "No logging layers enabled. Enable console or file output.".to_owned(),
            ));
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }
}

/// A handle to the initialized logging system.
///
/// This struct holds the background worker guard. Drop this struct only
/// when the application is shutting down.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] to configure the global tracing
    /// subscriber.
    ///
    /// The `name` serves as the primary identifier for your logs and is used
    /// as the prefix for rotating log files (e.g., `my-app.log`,
    /// `my-app.log.1`).
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig::default(),
            name: NoName,
            file_state: std::marker::PhantomData,
        }
    }

    /// Returns a reference to the underlying worker guard, if present.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

/// Parses a configuration-file level string (`"debug"`, `"info"`, ...) into a
/// [`LevelFilter`].
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown level names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level).map_err(|_| {
        LoggerError::InvalidConfiguration(format!("unknown logging level {level:?}"))
    })
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration("Logger name cannot be empty".to_owned()));
    }

    if config.max_bytes == 0 {
        return Err(LoggerError::InvalidConfiguration(
            "max_bytes must be greater than zero".to_owned(),
        ));
    }

    if config.max_backups == 0 {
        return Err(LoggerError::InvalidConfiguration(
            "max_backups must be greater than zero".to_owned(),
        ));
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| {
                LoggerError::InvalidConfiguration(format!("Invalid env filter '{filter}': {e}"))
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn builder_defaults_are_sane() {
        let builder = Logger::builder().name("test-app").env_filter("press=debug");
        assert!(builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert_eq!(builder.config.max_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(builder.config.max_backups, DEFAULT_MAX_BACKUPS);
        assert_eq!(builder.config.env_filter.as_deref(), Some("press=debug"));
        assert!(builder.config.path.is_none());
    }

    #[test]
    fn builder_applies_file_settings() {
        let builder = Logger::builder()
            .name("test-app")
            .level(LevelFilter::DEBUG)
            .path("logs")
            .max_bytes(1024)
            .max_backups(3);

        assert_eq!(builder.config.level, LevelFilter::DEBUG);
        assert_eq!(builder.config.max_bytes, 1024);
        assert_eq!(builder.config.max_backups, 3);
        assert_eq!(builder.config.path.as_deref(), Some(std::path::Path::new("logs")));
    }

    #[test]
    fn rejects_zero_caps() {
        let config = LoggerConfig { max_bytes: 0, ..LoggerConfig::default() };
        assert!(matches!(
            validate_config(&config, "app"),
            Err(LoggerError::InvalidConfiguration(_))
        ));

        let config = LoggerConfig { max_backups: 0, ..LoggerConfig::default() };
        assert!(matches!(
            validate_config(&config, "app"),
            Err(LoggerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn parses_level_strings() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::INFO);
        assert!(parse_level("chatty").is_err());
    }

    #[test]
    #[serial]
    fn no_layers_is_rejected() {
        let err = Logger::builder()
            .name("test-app")
            .console(false)
            .init()
            .expect_err("no output configured");
        assert!(matches!(err, LoggerError::InvalidConfiguration(_)));
    }
}
