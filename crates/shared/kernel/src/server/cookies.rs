//! Minimal cookie header helpers.
//!
//! The platform only ever reads two cookies (the session id and the CSRF
//! token) and writes simple `Set-Cookie` values, so a full cookie jar is not
//! worth the dependency.

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;

/// Extracts the value of the cookie named `name` from the `Cookie` header.
pub(crate) fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
}

/// Appends a `Set-Cookie` header for a host-wide cookie.
///
/// `max_age` of `Some(0)` expires the cookie immediately; `None` makes it a
/// session cookie. Values containing characters that are invalid in a header
/// are dropped rather than emitted truncated.
pub(crate) fn set_cookie(
    response: &mut Response,
    name: &str,
    value: &str,
    max_age: Option<u64>,
    http_only: bool,
) {
    let mut cookie = format!("{name}={value}; Path=/; SameSite=Lax");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if let Some(seconds) = max_age {
        cookie.push_str("; Max-Age=");
        cookie.push_str(&seconds.to_string());
    }

    if let Ok(header_value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, header_value);
    } else {
        tracing::warn!(name, "Dropped Set-Cookie with invalid header characters");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_id=abc123; csrf_token=tok"),
        );

        assert_eq!(cookie_value(&headers, "session_id"), Some("abc123"));
        assert_eq!(cookie_value(&headers, "csrf_token"), Some("tok"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn prefix_names_do_not_match() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_id2=nope"));

        assert_eq!(cookie_value(&headers, "session_id"), None);
    }

    #[test]
    fn no_cookie_header_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(cookie_value(&headers, "session_id"), None);
    }

    #[test]
    fn set_cookie_formats_attributes() {
        let mut response = Response::new(Body::empty());
        set_cookie(&mut response, "session_id", "abc", Some(3600), true);

        let header = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("set-cookie header");
        assert!(header.starts_with("session_id=abc"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Max-Age=3600"));
        assert!(header.contains("SameSite=Lax"));
    }

    #[test]
    fn invalid_values_are_dropped() {
        let mut response = Response::new(Body::empty());
        set_cookie(&mut response, "session_id", "bad\nvalue", None, true);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}
