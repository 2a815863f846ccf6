//! Administration dashboard.
//!
//! Every route in this group is gated on the session's admin flag; anyone
//! else is bounced to the front page without learning whether the path
//! exists.

mod error;

pub use error::AdminError;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use press_domain::config::AppConfig;
use press_domain::constants::{ADMIN, SESSION_IS_ADMIN};
use press_domain::registry::{GroupState, RegisteredGroup};
use press_kernel::server::{AppState, Session};
use serde::Serialize;
use tracing::info;

/// Admin group state. Carries nothing yet; the registration itself is what
/// gates the dashboard routes into the application.
#[derive(Debug)]
pub struct Admin;

impl GroupState for Admin {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initializes the admin group.
///
/// # Errors
/// Infallible today; the `Result` keeps the signature uniform across groups.
pub fn init(_cfg: &AppConfig) -> Result<RegisteredGroup, AdminError> {
    info!("Admin route group initialized");

    Ok(RegisteredGroup::new(ADMIN, "/admin", Admin))
}

/// Routes owned by this group.
pub fn routes() -> Router<AppState> {
    // Both spellings land on the dashboard.
    Router::new().route("/admin", get(overview)).route("/admin/", get(overview))
}

#[derive(Debug, Serialize)]
struct Overview {
    groups: Vec<&'static str>,
    user_count: Option<u64>,
}

fn is_admin(session: &Session) -> bool {
    session.get::<bool>(SESSION_IS_ADMIN).unwrap_or_default()
}

async fn overview(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AdminError> {
    if !is_admin(&session) {
        return Ok(Redirect::to("/").into_response());
    }

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&*state.database)
        .await?;

    let overview =
        Overview { groups: state.group_names().collect(), user_count: u64::try_from(count).ok() };
    Ok(Json(overview).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_registers_under_the_admin_prefix() {
        let registered = init(&AppConfig::development()).expect("admin init");
        assert_eq!(registered.name, ADMIN);
        assert_eq!(registered.prefix, "/admin");
    }

    #[test]
    fn only_flagged_sessions_count_as_admin() {
        let session = Session::fresh();
        assert!(!is_admin(&session));

        session.insert(SESSION_IS_ADMIN, false);
        assert!(!is_admin(&session));

        session.insert(SESSION_IS_ADMIN, true);
        assert!(is_admin(&session));
    }
}
