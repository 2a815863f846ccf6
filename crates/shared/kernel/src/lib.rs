//! # Application Kernel
//!
//! Everything the route groups and the server binary share: the configuration
//! registry, the template engine, the application state, and the HTTP
//! middleware stack (sessions, CSRF, system routes).

pub mod config;
pub mod render;
pub mod server;

pub use press_domain as domain;

/// Length of generated session identifiers.
const SESSION_ID_LEN: usize = 32;

/// Generates a fresh, URL-safe session identifier.
#[must_use]
pub fn session_id() -> String {
    nanoid::nanoid!(SESSION_ID_LEN)
}

/// Returns `true` if `id` looks like an identifier produced by
/// [`session_id`]. Used to reject garbage cookies before touching the cache.
#[must_use]
pub fn is_session_id(id: &str) -> bool {
    id.len() == SESSION_ID_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
