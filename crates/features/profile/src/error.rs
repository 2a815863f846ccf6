use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use press_kernel::server::AppStateError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0}")]
    Validation(String),
    #[error("sign in to manage your profile")]
    LoginRequired,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    State(#[from] AppStateError),
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::LoginRequired => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Db(_) | Self::State(_) => {
                error!(error = %self, "Profile request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_owned())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
