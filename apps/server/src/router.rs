use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use pressroom::kernel::server::{AppState, csrf, not_found, session_layer, system_router};
use tower_http::trace::TraceLayer;

/// Assembles the complete application router.
///
/// Request path, outermost first: tracing, CSRF guard, session restore,
/// then the route groups. The fallback sits under the same middleware, so
/// even a 404 leaves with a fresh CSRF cookie.
#[allow(unreachable_pub)]
pub fn init(state: AppState) -> Router {
    Router::new()
        .merge(pressroom::routes())
        .merge(system_router())
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), session_layer))
        .layer(from_fn(csrf::csrf_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
