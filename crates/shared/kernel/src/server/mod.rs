//! HTTP plumbing shared by the server binary and the route groups.

mod cookies;
pub mod csrf;
mod health;
pub mod router;
pub mod session;
pub mod state;

pub use csrf::{CSRF_COOKIE, CSRF_HEADER};
pub use router::{not_found, system_router};
pub use session::{Session, session_layer};
pub use state::{AppState, AppStateBuilder, AppStateError};
