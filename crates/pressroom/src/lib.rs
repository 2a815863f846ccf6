//! # Pressroom
//!
//! The facade over every route group. The server binary talks to this crate
//! only; individual groups stay encapsulated behind it.
//!
//! Groups are initialized and routed in one fixed order: home, passport,
//! news, profile, admin. [`init`] and [`routes`] must agree on that order,
//! and the order is observable at runtime through
//! [`AppState::group_names`](press_kernel::server::AppState::group_names).

pub use press_domain as domain;
pub use press_kernel as kernel;

pub use press_admin as admin;
pub use press_home as home;
pub use press_news as news;
pub use press_passport as passport;
pub use press_profile as profile;

use axum::Router;
use press_domain::config::AppConfig;
use press_domain::registry::RegisteredGroup;
use press_kernel::server::AppState;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Home(#[from] home::HomeError),
    #[error(transparent)]
    Passport(#[from] passport::PassportError),
    #[error(transparent)]
    News(#[from] news::NewsError),
    #[error(transparent)]
    Profile(#[from] profile::ProfileError),
    #[error(transparent)]
    Admin(#[from] admin::AdminError),
}

/// Initializes every route group, in registration order.
///
/// # Errors
/// Fails fast with the first group that cannot initialize; a partially
/// initialized application never starts serving.
pub fn init(cfg: &AppConfig) -> Result<Vec<RegisteredGroup>, InitError> {
    let groups = vec![
        home::init(cfg)?,
        passport::init(cfg)?,
        news::init(cfg)?,
        profile::init(cfg)?,
        admin::init(cfg)?,
    ];

    info!(count = groups.len(), "Route groups initialized");
    Ok(groups)
}

/// Merges every group's routes, in the same order as [`init`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home::routes())
        .merge(passport::routes())
        .merge(news::routes())
        .merge(profile::routes())
        .merge(admin::routes())
}
