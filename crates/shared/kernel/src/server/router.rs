use super::health;
use super::state::AppState;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tracing::error;

/// Routes every deployment gets regardless of the registered groups.
pub fn system_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health::health_handler))
}

/// Fallback for unmatched paths: renders the friendly 404 page.
///
/// Falls back to plain text if the template engine fails, so the status code
/// is correct even in that pathological case.
pub async fn not_found(State(state): State<AppState>) -> impl IntoResponse {
    match state.templates.render("not_found.html", crate::render::context! {}) {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render the not-found page");
            (StatusCode::NOT_FOUND, "Page not found").into_response()
        }
    }
}
