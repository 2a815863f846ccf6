use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use press_kernel::server::AppStateError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum PassportError {
    #[error("{0}")]
    Validation(String),
    #[error("the username is already taken")]
    UserExists,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    State(#[from] AppStateError),
}

impl IntoResponse for PassportError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::UserExists => (StatusCode::CONFLICT, self.to_string()),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Hash(_) | Self::Db(_) | Self::State(_) => {
                error!(error = %self, "Passport request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_owned())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
