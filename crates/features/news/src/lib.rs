//! News detail page and per-user collection list.
//!
//! Viewing an article bumps its click counter, once in the cache (the fast
//! path the leaderboard is built from) and once in the database. Both bumps
//! are best effort: a degraded store never blocks the page.
//!
//! The collection list lives in the session, so collecting and un-collecting
//! never touch the database on the request path.

mod error;

pub use error::NewsError;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use press_domain::config::AppConfig;
use press_domain::constants::{
    CACHE_CLICKS_PREFIX, NEWS, SESSION_COLLECTED, SESSION_NICK_NAME, SESSION_USER_ID,
};
use press_domain::registry::{GroupState, RegisteredGroup};
use press_kernel::render::context;
use press_kernel::server::{AppState, Session, not_found};
use serde::Deserialize;
use serde_json::json;
use sqlx::FromRow;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{info, warn};

/// Hard cap on collected articles per session.
const DEFAULT_COLLECT_LIMIT: usize = 100;

#[derive(Debug)]
pub struct NewsInner {
    pub collect_limit: usize,
}

/// News group state.
#[derive(Debug, Clone)]
pub struct News {
    inner: Arc<NewsInner>,
}

impl Deref for News {
    type Target = NewsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl GroupState for News {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initializes the news group.
///
/// # Errors
/// Infallible today; the `Result` keeps the signature uniform across groups.
pub fn init(_cfg: &AppConfig) -> Result<RegisteredGroup, NewsError> {
    info!("News route group initialized");

    let state = News { inner: Arc::new(NewsInner { collect_limit: DEFAULT_COLLECT_LIMIT }) };
    Ok(RegisteredGroup::new(NEWS, "/news", state))
}

/// Routes owned by this group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/news/{id}", get(detail))
        .route("/news/collected", post(collect))
        .route("/news/cancel_collected", post(cancel_collect))
}

#[derive(Debug, FromRow)]
struct NewsRow {
    id: u64,
    title: String,
    source: String,
    content: String,
    clicks: i64,
}

async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
) -> Result<Response, NewsError> {
    let row: Option<NewsRow> = sqlx::query_as(
        "SELECT id, title, source, content, clicks FROM news WHERE id = ? AND status = 2",
    )
    .bind(id)
    .fetch_optional(&*state.database)
    .await?;

    let Some(row) = row else {
        return Ok(not_found(State(state)).await.into_response());
    };

    if let Err(error) = state.cache.incr(&click_key(id)).await {
        warn!(%error, news_id = id, "Failed to bump cached click counter");
    }
    if let Err(error) = sqlx::query("UPDATE news SET clicks = clicks + 1 WHERE id = ?")
        .bind(id)
        .execute(&*state.database)
        .await
    {
        warn!(%error, news_id = id, "Failed to bump stored click counter");
    }

    let username: Option<String> = session.get(SESSION_NICK_NAME);
    let collected = collected_ids(&session).contains(&row.id);

    let body = state.templates.render(
        "news_detail.html",
        context! {
            id => row.id,
            title => row.title,
            source => row.source,
            content => row.content,
            clicks => row.clicks + 1,
            username => username,
            collected => collected,
        },
    )?;
    Ok(Html(body).into_response())
}

#[derive(Debug, Deserialize)]
struct CollectForm {
    news_id: u64,
}

async fn collect(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CollectForm>,
) -> Result<Json<serde_json::Value>, NewsError> {
    require_login(&session)?;
    let group = state.try_group::<News>()?;

    let mut collected = collected_ids(&session);
    if !collected.contains(&form.news_id) {
        if collected.len() >= group.collect_limit {
            return Err(NewsError::Validation(format!(
                "cannot collect more than {} articles",
                group.collect_limit
            )));
        }
        collected.push(form.news_id);
        session.insert(SESSION_COLLECTED, collected);
    }

    Ok(Json(json!({ "message": "collected" })))
}

async fn cancel_collect(
    session: Session,
    Json(form): Json<CollectForm>,
) -> Result<Json<serde_json::Value>, NewsError> {
    require_login(&session)?;

    let mut collected = collected_ids(&session);
    if let Some(position) = collected.iter().position(|id| *id == form.news_id) {
        collected.remove(position);
        session.insert(SESSION_COLLECTED, collected);
    }

    Ok(Json(json!({ "message": "collection cancelled" })))
}

fn require_login(session: &Session) -> Result<u64, NewsError> {
    session.get::<u64>(SESSION_USER_ID).ok_or(NewsError::LoginRequired)
}

fn collected_ids(session: &Session) -> Vec<u64> {
    session.get(SESSION_COLLECTED).unwrap_or_default()
}

fn click_key(id: u64) -> String {
    format!("{CACHE_CLICKS_PREFIX}:{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in_session() -> Session {
        let session = Session::fresh();
        session.insert(SESSION_USER_ID, 1_u64);
        session
    }

    #[test]
    fn init_registers_under_the_news_prefix() {
        let registered = init(&AppConfig::development()).expect("news init");
        assert_eq!(registered.name, NEWS);
        assert_eq!(registered.prefix, "/news");
    }

    #[test]
    fn click_keys_are_namespaced_per_article() {
        assert_eq!(click_key(42), "news:clicks:42");
    }

    #[test]
    fn anonymous_sessions_cannot_collect() {
        let session = Session::fresh();
        let err = require_login(&session).expect_err("login required");
        assert!(matches!(err, NewsError::LoginRequired));
    }

    #[tokio::test]
    async fn cancel_collect_removes_only_the_target() {
        let session = signed_in_session();
        session.insert(SESSION_COLLECTED, vec![3_u64, 5, 8]);

        cancel_collect(session.clone(), Json(CollectForm { news_id: 5 }))
            .await
            .expect("cancel collect");

        assert_eq!(collected_ids(&session), vec![3, 8]);
    }

    #[tokio::test]
    async fn cancelling_an_uncollected_article_is_a_no_op() {
        let session = signed_in_session();
        session.insert(SESSION_COLLECTED, vec![3_u64]);

        cancel_collect(session.clone(), Json(CollectForm { news_id: 99 }))
            .await
            .expect("cancel collect");

        assert_eq!(collected_ids(&session), vec![3]);
    }
}
