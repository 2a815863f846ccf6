//! In-memory cache backend.
//!
//! Mirrors the small slice of Redis the platform uses (`SET EX`, `GET`,
//! `DEL`, `INCR`) so development profiles and tests can run without a cache
//! server, the same way the database layer runs against in-process engines in
//! tests elsewhere in the workspace.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub(crate) fn set_ex(&self, key: &str, value: &str, ttl: Duration) {
        let expires_at = Some(Instant::now() + ttl);
        self.entries
            .lock()
            .insert(key.to_owned(), Entry { value: value.to_owned(), expires_at });
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub(crate) fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Increments the integer stored at `key`, starting from zero for a
    /// missing key. Expiry is preserved, matching Redis `INCR`.
    pub(crate) fn incr(&self, key: &str) -> i64 {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        let current = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.value.parse::<i64>().unwrap_or_default()
            }
            _ => 0,
        };
        let next = current + 1;

        let expires_at =
            entries.get(key).filter(|entry| !entry.is_expired(now)).and_then(|e| e.expires_at);
        entries.insert(key.to_owned(), Entry { value: next.to_string(), expires_at });

        next
    }
}
