//! Registration, login and logout.
//!
//! JSON endpoints consumed by the front-end scripts. Successful register and
//! login write the user's identity into the server-side session; logout
//! clears it, which tears down the session record and cookie.

mod error;

pub use error::PassportError;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use press_domain::config::AppConfig;
use press_domain::constants::{
    PASSPORT, SESSION_IS_ADMIN, SESSION_NICK_NAME, SESSION_USER_ID, SESSION_USERNAME,
};
use press_domain::registry::{GroupState, RegisteredGroup};
use press_kernel::server::{AppState, Session};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_MIN_PASSWORD_LEN: usize = 6;
const MAX_USERNAME_LEN: usize = 32;

#[derive(Debug)]
pub struct PassportInner {
    pub min_password_len: usize,
}

/// Passport group state.
#[derive(Debug, Clone)]
pub struct Passport {
    inner: Arc<PassportInner>,
}

impl Deref for Passport {
    type Target = PassportInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl GroupState for Passport {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initializes the passport group.
///
/// # Errors
/// Infallible today; the `Result` keeps the signature uniform across groups.
pub fn init(_cfg: &AppConfig) -> Result<RegisteredGroup, PassportError> {
    info!("Passport route group initialized");

    let state =
        Passport { inner: Arc::new(PassportInner { min_password_len: DEFAULT_MIN_PASSWORD_LEN }) };
    Ok(RegisteredGroup::new(PASSPORT, "/passport", state))
}

/// Routes owned by this group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/passport/register", post(register))
        .route("/passport/login", post(login))
        .route("/passport/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    id: u64,
    username: String,
    nick_name: String,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: u64,
    username: String,
    nick_name: String,
    password_hash: String,
    is_admin: bool,
}

fn validate(group: &Passport, form: &Credentials) -> Result<(), PassportError> {
    // Limits are phrased in characters, so multibyte names are measured as
    // characters, not bytes.
    let username_len = form.username.chars().count();
    if username_len == 0 || username_len > MAX_USERNAME_LEN {
        return Err(PassportError::Validation(format!(
            "username must be between 1 and {MAX_USERNAME_LEN} characters"
        )));
    }
    if form.password.chars().count() < group.min_password_len {
        return Err(PassportError::Validation(format!(
            "password must be at least {} characters",
            group.min_password_len
        )));
    }
    Ok(())
}

async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<(StatusCode, Json<UserResponse>), PassportError> {
    let group = state.try_group::<Passport>()?;
    validate(group, &form)?;

    let password_hash = bcrypt::hash(&form.password, bcrypt::DEFAULT_COST)?;

    let result =
        sqlx::query("INSERT INTO users (username, nick_name, password_hash) VALUES (?, ?, ?)")
            .bind(&form.username)
            .bind(&form.username)
            .bind(&password_hash)
            .execute(&*state.database)
            .await
            .map_err(|error| {
                if error.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                    PassportError::UserExists
                } else {
                    PassportError::Db(error)
                }
            })?;
    let id = result.last_insert_id();

    session.insert(SESSION_USER_ID, id);
    session.insert(SESSION_USERNAME, &form.username);
    session.insert(SESSION_NICK_NAME, &form.username);

    info!(user_id = id, "New user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse { id, username: form.username.clone(), nick_name: form.username }),
    ))
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<Json<UserResponse>, PassportError> {
    let user: UserRow = sqlx::query_as(
        "SELECT id, username, nick_name, password_hash, is_admin FROM users WHERE username = ?",
    )
    .bind(&form.username)
    .fetch_optional(&*state.database)
    .await?
    .ok_or(PassportError::InvalidCredentials)?;

    if !bcrypt::verify(&form.password, &user.password_hash)? {
        return Err(PassportError::InvalidCredentials);
    }

    session.insert(SESSION_USER_ID, user.id);
    session.insert(SESSION_USERNAME, &user.username);
    session.insert(SESSION_NICK_NAME, &user.nick_name);
    session.insert(SESSION_IS_ADMIN, user.is_admin);

    // Best effort: a failed timestamp update must not fail the login.
    if let Err(error) = sqlx::query("UPDATE users SET last_login = NOW() WHERE id = ?")
        .bind(user.id)
        .execute(&*state.database)
        .await
    {
        warn!(%error, user_id = user.id, "Failed to record last login");
    }

    Ok(Json(UserResponse { id: user.id, username: user.username, nick_name: user.nick_name }))
}

async fn logout(session: Session) -> Json<serde_json::Value> {
    session.clear();
    Json(serde_json::json!({ "message": "logged out" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Passport {
        Passport { inner: Arc::new(PassportInner { min_password_len: DEFAULT_MIN_PASSWORD_LEN }) }
    }

    #[test]
    fn init_registers_under_the_passport_prefix() {
        let registered = init(&AppConfig::development()).expect("passport init");
        assert_eq!(registered.name, PASSPORT);
        assert_eq!(registered.prefix, "/passport");
    }

    #[test]
    fn short_passwords_are_rejected() {
        let form = Credentials { username: "reader".to_owned(), password: "short".to_owned() };
        let err = validate(&group(), &form).expect_err("password too short");
        assert!(matches!(err, PassportError::Validation(_)));
    }

    #[test]
    fn empty_and_oversized_usernames_are_rejected() {
        let empty = Credentials { username: String::new(), password: "longenough".to_owned() };
        assert!(validate(&group(), &empty).is_err());

        let oversized = Credentials {
            username: "u".repeat(MAX_USERNAME_LEN + 1),
            password: "longenough".to_owned(),
        };
        assert!(validate(&group(), &oversized).is_err());
    }

    #[test]
    fn multibyte_usernames_are_measured_in_characters() {
        // 20 characters but 60 bytes; must pass a 32-character limit.
        let form =
            Credentials { username: "新".repeat(20), password: "longenough".to_owned() };
        assert!(validate(&group(), &form).is_ok());

        let oversized =
            Credentials { username: "新".repeat(33), password: "longenough".to_owned() };
        assert!(validate(&group(), &oversized).is_err());
    }

    #[test]
    fn valid_credentials_pass_validation() {
        let form = Credentials { username: "reader".to_owned(), password: "longenough".to_owned() };
        assert!(validate(&group(), &form).is_ok());
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let session = Session::fresh();
        session.insert(SESSION_USER_ID, 7_u64);
        assert!(!session.is_empty());

        logout(session.clone()).await;
        assert!(session.is_empty());
    }
}
