//! Signed-in user's profile.
//!
//! Anonymous visitors are redirected to the front page rather than rejected,
//! so a stale bookmark degrades gracefully.

mod error;

pub use error::ProfileError;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use press_domain::config::AppConfig;
use press_domain::constants::{
    PROFILE, SESSION_IS_ADMIN, SESSION_NICK_NAME, SESSION_USER_ID, SESSION_USERNAME,
};
use press_domain::registry::{GroupState, RegisteredGroup};
use press_kernel::server::{AppState, Session};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;
use tracing::info;

const DEFAULT_NICK_NAME_MAX_LEN: usize = 32;

#[derive(Debug)]
pub struct ProfileInner {
    pub nick_name_max_len: usize,
}

/// Profile group state.
#[derive(Debug, Clone)]
pub struct Profile {
    inner: Arc<ProfileInner>,
}

impl Deref for Profile {
    type Target = ProfileInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl GroupState for Profile {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initializes the profile group.
///
/// # Errors
/// Infallible today; the `Result` keeps the signature uniform across groups.
pub fn init(_cfg: &AppConfig) -> Result<RegisteredGroup, ProfileError> {
    info!("Profile route group initialized");

    let state =
        Profile { inner: Arc::new(ProfileInner { nick_name_max_len: DEFAULT_NICK_NAME_MAX_LEN }) };
    Ok(RegisteredGroup::new(PROFILE, "/user", state))
}

/// Routes owned by this group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/info", get(info_page))
        .route("/user/base_info", post(base_info))
}

#[derive(Debug, Serialize)]
struct UserInfo {
    id: u64,
    username: String,
    nick_name: String,
    is_admin: bool,
}

async fn info_page(session: Session) -> Response {
    let Some(id) = session.get::<u64>(SESSION_USER_ID) else {
        return Redirect::to("/").into_response();
    };

    Json(UserInfo {
        id,
        username: session.get(SESSION_USERNAME).unwrap_or_default(),
        nick_name: session.get(SESSION_NICK_NAME).unwrap_or_default(),
        is_admin: session.get(SESSION_IS_ADMIN).unwrap_or_default(),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct BaseInfoForm {
    nick_name: String,
}

async fn base_info(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<BaseInfoForm>,
) -> Result<Json<serde_json::Value>, ProfileError> {
    let user_id = session.get::<u64>(SESSION_USER_ID).ok_or(ProfileError::LoginRequired)?;
    let group = state.try_group::<Profile>()?;

    let nick_name = form.nick_name.trim();
    validate_nick_name(group, nick_name)?;

    sqlx::query("UPDATE users SET nick_name = ? WHERE id = ?")
        .bind(nick_name)
        .bind(user_id)
        .execute(&*state.database)
        .await?;

    session.insert(SESSION_NICK_NAME, nick_name);
    Ok(Json(serde_json::json!({ "message": "profile updated" })))
}

fn validate_nick_name(group: &Profile, nick_name: &str) -> Result<(), ProfileError> {
    // The limit is phrased in characters, so multibyte names are measured as
    // characters, not bytes.
    let len = nick_name.chars().count();
    if len == 0 || len > group.nick_name_max_len {
        return Err(ProfileError::Validation(format!(
            "nick name must be between 1 and {} characters",
            group.nick_name_max_len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};

    #[test]
    fn init_registers_under_the_user_prefix() {
        let registered = init(&AppConfig::development()).expect("profile init");
        assert_eq!(registered.name, PROFILE);
        assert_eq!(registered.prefix, "/user");
    }

    #[test]
    fn multibyte_nick_names_are_measured_in_characters() {
        let group = Profile {
            inner: Arc::new(ProfileInner { nick_name_max_len: DEFAULT_NICK_NAME_MAX_LEN }),
        };

        // 20 characters but 60 bytes; must pass a 32-character limit.
        assert!(validate_nick_name(&group, &"读".repeat(20)).is_ok());
        assert!(validate_nick_name(&group, &"读".repeat(33)).is_err());
        assert!(validate_nick_name(&group, "").is_err());
    }

    #[tokio::test]
    async fn anonymous_visitors_are_redirected_home() {
        let response = info_page(Session::fresh()).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/")
        );
    }

    #[tokio::test]
    async fn signed_in_visitors_get_their_info() {
        let session = Session::fresh();
        session.insert(SESSION_USER_ID, 9_u64);
        session.insert(SESSION_USERNAME, "reader");
        session.insert(SESSION_NICK_NAME, "Reader");

        let response = info_page(session).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
