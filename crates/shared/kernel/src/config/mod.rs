//! Named-profile configuration registry.
//!
//! A deployment is selected by *name* (`development`, `production`, or any
//! profile declared in the configuration file). The registry implements a
//! layered strategy:
//! 1. **Built-ins**: `development` and `production` always exist with sane
//!    defaults, so the application boots with no file at all.
//! 2. **Base file**: profiles loaded from a file (e.g. `pressroom.toml`)
//!    are merged over the built-ins. If no path is provided the loader looks
//!    for a `pressroom` file in the working directory.
//! 3. **Environment overrides**: variables prefixed with `PRESS__` overlay
//!    file values. Nested fields use double underscores, e.g.
//!    `PRESS__PROFILES__PRODUCTION__REDIS__HOST` maps to
//!    `profiles.production.redis.host`.

use config::{Config, Environment, File};
use press_domain::config::AppConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Names of the profiles that are always present.
pub const DEVELOPMENT: &str = "development";
pub const PRODUCTION: &str = "production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("unknown deployment profile {name:?}, known profiles: {}", known.join(", "))]
    ProfileNotFound { name: String, known: Vec<String> },
}

/// On-disk shape of the registry file.
#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    profiles: BTreeMap<String, AppConfig>,
}

/// All known deployment profiles, keyed by name.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    profiles: BTreeMap<String, AppConfig>,
}

impl ConfigRegistry {
    /// Loads the registry from `path` (defaults to a `pressroom` file in the
    /// working directory) plus `PRESS__`-prefixed environment overrides.
    ///
    /// A missing file is not an error: the built-in profiles still apply.
    ///
    /// # Errors
    /// Returns [`ConfigError::Load`] if the file exists but cannot be parsed
    /// or does not match the expected shape.
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let effective_path =
            path.map_or_else(|| PathBuf::from("pressroom"), |p| p.as_ref().to_path_buf());

        let builder = Config::builder()
            .add_source(File::from(effective_path.as_path()).required(false))
            .add_source(
                Environment::with_prefix("PRESS")
                    .separator("__")
                    .convert_case(config::Case::Snake),
            );

        info!("Loading configuration registry from {}", effective_path.display());

        let file: RegistryFile = builder.build()?.try_deserialize()?;

        let mut profiles = file.profiles;
        profiles.entry(DEVELOPMENT.to_owned()).or_insert_with(AppConfig::development);
        profiles.entry(PRODUCTION.to_owned()).or_insert_with(AppConfig::production);

        Ok(Self { profiles })
    }

    /// Looks up the profile registered under `name`.
    ///
    /// # Errors
    /// Returns [`ConfigError::ProfileNotFound`] listing the known profiles,
    /// so a typo in `PRESS_ENV` fails with an actionable message.
    pub fn profile(&self, name: &str) -> Result<AppConfig, ConfigError> {
        self.profiles.get(name).cloned().ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_owned(),
            known: self.names().map(str::to_owned).collect(),
        })
    }

    /// Iterates over the known profile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn built_in_profiles_always_exist() -> Result<(), ConfigError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = ConfigRegistry::load(Some(dir.path().join("absent.toml")))?;

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec![DEVELOPMENT, PRODUCTION]);

        let dev = registry.profile(DEVELOPMENT)?;
        assert_eq!(dev.logging.level, "debug");
        Ok(())
    }

    #[test]
    #[serial]
    fn unknown_profile_lists_known_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry =
            ConfigRegistry::load(Some(dir.path().join("absent.toml"))).expect("registry");

        let err = registry.profile("staging").expect_err("unknown profile");
        let msg = err.to_string();
        assert!(msg.contains("staging"), "message should name the profile: {msg}");
        assert!(msg.contains(DEVELOPMENT), "message should list known profiles: {msg}");
    }

    #[test]
    #[serial]
    fn file_profiles_merge_over_built_ins() -> Result<(), ConfigError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pressroom.toml");
        let mut file = std::fs::File::create(&path).expect("config file");
        writeln!(
            file,
            r#"
            [profiles.production.server]
            port = 9000

            [profiles.staging.redis]
            host = "cache.staging.internal"
            "#
        )
        .expect("write config");

        let registry = ConfigRegistry::load(Some(&path))?;

        let prod = registry.profile(PRODUCTION)?;
        assert_eq!(prod.server.port, 9000);

        let staging = registry.profile("staging")?;
        assert_eq!(staging.redis.host, "cache.staging.internal");
        // Untouched fields keep their defaults.
        assert_eq!(staging.server.port, 8000);

        // Built-in development survives alongside file profiles.
        assert!(registry.names().any(|n| n == DEVELOPMENT));
        Ok(())
    }
}
