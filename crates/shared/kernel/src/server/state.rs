use crate::render::Templates;
use axum::extract::FromRef;
use press_cache::Cache;
use press_db::Database;
use press_domain::config::AppConfig;
use press_domain::registry::{GroupState, RegisteredGroup};
use std::any::TypeId;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppStateError {
    #[error("state validation error: {0}")]
    Validation(&'static str),
    #[error("state missing route group: {0}")]
    MissingGroup(&'static str),
    #[error(transparent)]
    Render(#[from] crate::render::RenderError),
}

#[derive(Debug)]
pub struct AppStateInner {
    pub config: AppConfig,
    pub database: Database,
    pub cache: Cache,
    pub templates: Templates,
    /// Route groups in registration order.
    groups: Vec<RegisteredGroup>,
}

/// Shared application state, handed to every route group at registration.
///
/// All handles are cloneable; cloning the state is an `Arc` bump.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    #[must_use]
    pub fn group<T: GroupState>(&self) -> Option<&T> {
        self.inner
            .groups
            .iter()
            .find(|group| group.id == TypeId::of::<T>())
            .and_then(|group| group.state.as_any().downcast_ref::<T>())
    }

    /// Returns a reference to the group state if it is registered.
    ///
    /// # Errors
    /// Returns an error if the group is not registered.
    pub fn try_group<T: GroupState>(&self) -> Result<&T, AppStateError> {
        self.group::<T>()
            .ok_or_else(|| AppStateError::MissingGroup(std::any::type_name::<T>()))
    }

    /// Names of the registered route groups, in registration order.
    pub fn group_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.groups.iter().map(|group| group.name)
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.inner.database.clone()
    }
}

impl FromRef<AppState> for Cache {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cache.clone()
    }
}

impl FromRef<AppState> for Templates {
    fn from_ref(state: &AppState) -> Self {
        state.inner.templates.clone()
    }
}

#[derive(Debug, Default)]
pub struct AppStateBuilder {
    config: Option<AppConfig>,
    database: Option<Database>,
    cache: Option<Cache>,
    templates: Option<Templates>,
    groups: Vec<RegisteredGroup>,
}

impl AppStateBuilder {
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn templates(mut self, templates: Templates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Registers a route group. Order is preserved and observable through
    /// [`AppState::group_names`].
    pub fn register_group(mut self, group: RegisteredGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Registers multiple groups at once, preserving iteration order.
    pub fn register_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = RegisteredGroup>,
    {
        self.groups.extend(groups);
        self
    }

    /// Finalizes the state.
    ///
    /// # Errors
    /// Returns an error if a required handle is missing, or if the default
    /// template set fails to compile when none was provided.
    pub fn build(self) -> Result<AppState, AppStateError> {
        let config =
            self.config.ok_or(AppStateError::Validation("AppConfig not provided"))?;
        let database =
            self.database.ok_or(AppStateError::Validation("Database not provided"))?;
        let cache = self.cache.ok_or(AppStateError::Validation("Cache not provided"))?;
        let templates = match self.templates {
            Some(templates) => templates,
            None => Templates::new()?,
        };

        Ok(AppState {
            inner: Arc::new(AppStateInner {
                config,
                database,
                cache,
                templates,
                groups: self.groups,
            }),
        })
    }
}
