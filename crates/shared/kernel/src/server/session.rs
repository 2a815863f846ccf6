//! Server-side sessions backed by the cache store.
//!
//! The cookie carries only an opaque session id; all session data lives in
//! the cache under `session:<id>` as a JSON object, with the configured
//! time-to-live. The middleware restores the session before the handler runs
//! and persists it afterwards, but only if the handler changed something.

use super::cookies;
use super::state::AppState;
use crate::{is_session_id, session_id};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::{StatusCode, request::Parts};
use axum::middleware::Next;
use axum::response::Response;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

fn record_key(id: &str) -> String {
    format!("session:{id}")
}

#[derive(Debug, Default)]
struct SessionInner {
    id: String,
    data: BTreeMap<String, Value>,
    /// No cookie for this session has been sent to the client yet.
    fresh: bool,
    /// A handler mutated the data since the session was restored.
    changed: bool,
}

/// A cloneable handle to the per-request session.
///
/// Extracted via [`FromRequestParts`]; requires the session middleware to be
/// installed on the router.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    /// A brand-new empty session with a generated id. The middleware creates
    /// these for first-time visitors; handler tests can construct one
    /// directly.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                id: session_id(),
                fresh: true,
                ..SessionInner::default()
            })),
        }
    }

    fn restored(id: String, data: BTreeMap<String, Value>) -> Self {
        Self { inner: Arc::new(Mutex::new(SessionInner { id, data, ..SessionInner::default() })) }
    }

    /// The opaque session identifier.
    #[must_use]
    pub fn id(&self) -> String {
        self.inner.lock().id.clone()
    }

    /// Reads and deserializes the value stored under `key`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.inner.lock().data.get(key).cloned()?;
        serde_json::from_value(value).ok()
    }

    /// Stores `value` under `key`. Values that cannot be represented as JSON
    /// are dropped with a warning.
    pub fn insert(&self, key: impl Into<String>, value: impl Serialize) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                let mut inner = self.inner.lock();
                inner.data.insert(key, value);
                inner.changed = true;
            }
            Err(error) => warn!(key, %error, "Dropped unserializable session value"),
        }
    }

    /// Removes `key`, returning the previous value if any.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.lock();
        let removed = inner.data.remove(key);
        if removed.is_some() {
            inner.changed = true;
        }
        removed
    }

    /// Drops all session data. The backing record is deleted and the cookie
    /// expired when the response is written.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.data.clear();
        inner.changed = true;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().data.is_empty()
    }

    fn snapshot(&self) -> (String, BTreeMap<String, Value>, bool, bool) {
        let inner = self.inner.lock();
        (inner.id.clone(), inner.data.clone(), inner.fresh, inner.changed)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "session middleware is not installed",
        ))
    }
}

/// Middleware restoring the session before the handler and persisting it
/// after. Installed with [`axum::middleware::from_fn_with_state`].
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let cookie_name = state.config.session.cookie_name.clone();
    let ttl = Duration::from_secs(state.config.session.ttl_seconds);

    let session = match cookies::cookie_value(req.headers(), &cookie_name) {
        Some(id) if is_session_id(id) => restore(&state, id).await,
        _ => Session::fresh(),
    };

    req.extensions_mut().insert(session.clone());
    let mut response = next.run(req).await;

    let (id, data, fresh, changed) = session.snapshot();
    if !changed {
        return response;
    }

    if data.is_empty() {
        if let Err(error) = state.cache.delete(&record_key(&id)).await {
            warn!(%error, "Failed to delete session record");
        }
        if !fresh {
            cookies::set_cookie(&mut response, &cookie_name, "", Some(0), true);
        }
    } else {
        match serde_json::to_string(&data) {
            Ok(raw) => {
                if let Err(error) = state.cache.set_ex(&record_key(&id), &raw, ttl).await {
                    warn!(%error, "Failed to persist session record");
                }
            }
            Err(error) => warn!(%error, "Failed to serialize session record"),
        }
        if fresh {
            cookies::set_cookie(&mut response, &cookie_name, &id, Some(ttl.as_secs()), true);
        }
    }

    response
}

async fn restore(state: &AppState, id: &str) -> Session {
    match state.cache.get(&record_key(id)).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(data) => Session::restored(id.to_owned(), data),
            Err(error) => {
                warn!(%error, "Corrupt session record, starting a fresh session");
                Session::fresh()
            }
        },
        // Unknown or expired id: never adopt a client-chosen identifier.
        Ok(None) => Session::fresh(),
        Err(error) => {
            warn!(%error, "Cache unavailable while restoring session");
            Session::fresh()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_sessions_start_unchanged() {
        let session = Session::fresh();
        let (_, data, fresh, changed) = session.snapshot();

        assert!(data.is_empty());
        assert!(fresh);
        assert!(!changed);
    }

    #[test]
    fn insert_and_get_round_trip() {
        let session = Session::fresh();
        session.insert("user_id", 42_u64);
        session.insert("username", "press");

        assert_eq!(session.get::<u64>("user_id"), Some(42));
        assert_eq!(session.get::<String>("username"), Some("press".to_owned()));
        assert_eq!(session.get::<u64>("missing"), None);

        let (_, _, _, changed) = session.snapshot();
        assert!(changed);
    }

    #[test]
    fn removing_an_absent_key_does_not_mark_changed() {
        let session = Session::fresh();
        assert!(session.remove("missing").is_none());

        let (_, _, _, changed) = session.snapshot();
        assert!(!changed);
    }

    #[test]
    fn clear_always_marks_changed() {
        let session = Session::fresh();
        session.clear();

        let (_, data, _, changed) = session.snapshot();
        assert!(data.is_empty());
        assert!(changed, "logout must force cookie and record teardown");
    }

    #[test]
    fn restored_sessions_keep_their_id() {
        let mut data = BTreeMap::new();
        data.insert("user_id".to_owned(), Value::from(1));

        let session = Session::restored("a".repeat(32), data);
        assert_eq!(session.id(), "a".repeat(32));

        let (_, _, fresh, changed) = session.snapshot();
        assert!(!fresh);
        assert!(!changed);
    }
}
