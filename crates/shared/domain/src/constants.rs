//! Shared string constants: route group names and session keys.

/// Route group names, in registration order.
pub const HOME: &str = "home";
pub const PASSPORT: &str = "passport";
pub const NEWS: &str = "news";
pub const PROFILE: &str = "profile";
pub const ADMIN: &str = "admin";

/// Cache key holding the pre-ranked hot-news list as a JSON array.
pub const CACHE_HOT_NEWS: &str = "news:hot";
/// Cache key prefix for per-article click counters.
pub const CACHE_CLICKS_PREFIX: &str = "news:clicks";

/// Session keys written by the passport group and read everywhere else.
pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_USERNAME: &str = "username";
pub const SESSION_NICK_NAME: &str = "nick_name";
pub const SESSION_IS_ADMIN: &str = "is_admin";
pub const SESSION_COLLECTED: &str = "collected";
