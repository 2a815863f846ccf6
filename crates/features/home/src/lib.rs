//! Front page route group.
//!
//! Renders the hot-news leaderboard. The ranked list is read through the
//! cache: a pre-ranked JSON array under a well-known key serves the page
//! even when the database is busy, with a database query as the fallback
//! that repopulates the cache entry.

mod error;

pub use error::HomeError;

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use press_domain::config::AppConfig;
use press_domain::constants::{CACHE_HOT_NEWS, HOME, SESSION_NICK_NAME};
use press_domain::registry::{GroupState, RegisteredGroup};
use press_kernel::render::context;
use press_kernel::server::{AppState, Session};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How many articles the leaderboard shows.
const DEFAULT_HOT_LIMIT: usize = 10;
/// How long a repopulated leaderboard entry stays cached.
const HOT_CACHE_TTL: Duration = Duration::from_secs(120);

/// One leaderboard entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HotNews {
    pub id: u64,
    pub title: String,
    pub clicks: i64,
}

#[derive(Debug)]
pub struct HomeInner {
    pub hot_limit: usize,
}

/// Front page group state.
#[derive(Debug, Clone)]
pub struct Home {
    inner: Arc<HomeInner>,
}

impl Deref for Home {
    type Target = HomeInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl GroupState for Home {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initializes the front page group.
///
/// # Errors
/// Infallible today; the `Result` keeps the signature uniform across groups.
pub fn init(_cfg: &AppConfig) -> Result<RegisteredGroup, HomeError> {
    info!("Home route group initialized");

    let state = Home { inner: Arc::new(HomeInner { hot_limit: DEFAULT_HOT_LIMIT }) };
    Ok(RegisteredGroup::new(HOME, "/", state))
}

/// Routes owned by this group.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<AppState>, session: Session) -> Result<Html<String>, HomeError> {
    let group = state.try_group::<Home>()?;
    let hot = hot_news(&state, group.hot_limit).await;
    let username: Option<String> = session.get(SESSION_NICK_NAME);

    let body = state
        .templates
        .render("index.html", context! { username => username, hot => hot })?;
    Ok(Html(body))
}

/// Cache first, database as fallback. An empty leaderboard is not an error:
/// the front page must render even with both stores degraded.
async fn hot_news(state: &AppState, limit: usize) -> Vec<HotNews> {
    match state.cache.get(CACHE_HOT_NEWS).await {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<HotNews>>(&raw) {
            Ok(mut hot) => {
                hot.truncate(limit);
                return hot;
            }
            Err(error) => warn!(%error, "Discarding corrupt hot-news cache entry"),
        },
        Ok(None) => {}
        Err(error) => warn!(%error, "Cache unavailable for hot news"),
    }

    let rows: Vec<HotNews> = match sqlx::query_as(
        "SELECT id, title, clicks FROM news WHERE status = 2 ORDER BY clicks DESC LIMIT ?",
    )
    .bind(limit as u64)
    .fetch_all(&*state.database)
    .await
    {
        Ok(rows) => rows,
        Err(error) => {
            warn!(%error, "Database unavailable for hot news, rendering empty leaderboard");
            return Vec::new();
        }
    };

    if let Ok(raw) = serde_json::to_string(&rows) {
        if let Err(error) = state.cache.set_ex(CACHE_HOT_NEWS, &raw, HOT_CACHE_TTL).await {
            warn!(%error, "Failed to repopulate hot-news cache entry");
        }
    }

    rows
}
