use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use press_kernel::render::RenderError;
use press_kernel::server::AppStateError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum HomeError {
    #[error(transparent)]
    State(#[from] AppStateError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for HomeError {
    fn into_response(self) -> Response {
        error!(error = %self, "Front page request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    }
}
