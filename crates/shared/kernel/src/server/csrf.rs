//! Cross-site request forgery protection.
//!
//! Double-submit cookie scheme: every response carries a fresh `csrf_token`
//! cookie, and every state-changing request must echo the cookie value back
//! in the `X-CSRFToken` header. The cookie is deliberately *not* `HttpOnly`
//! so front-end scripts can read it and attach the header.

use super::cookies;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

/// Cookie carrying the token to the front end.
pub const CSRF_COOKIE: &str = "csrf_token";
/// Header the front end echoes the token back in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

const TOKEN_BYTES: usize = 32;

/// Generates a fresh random token, URL-safe base64 without padding.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// Middleware enforcing the double-submit check and stamping the token.
///
/// Rejected requests still receive a fresh token cookie, so a client whose
/// token expired recovers on the next attempt.
pub async fn csrf_layer(req: Request, next: Next) -> Response {
    let mut response = if is_read_only(req.method()) {
        next.run(req).await
    } else {
        let cookie = cookies::cookie_value(req.headers(), CSRF_COOKIE).unwrap_or_default();
        let header = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if cookie.is_empty() || cookie != header {
            debug!(method = %req.method(), path = %req.uri().path(), "Rejected request without a valid CSRF token");
            (StatusCode::FORBIDDEN, "The CSRF token is missing or invalid").into_response()
        } else {
            next.run(req).await
        }
    };

    // Every response leaves with a fresh token, rejections included.
    cookies::set_cookie(&mut response, CSRF_COOKIE, &generate_token(), None, false);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_header_safe() {
        let first = generate_token();
        let second = generate_token();

        assert_ne!(first, second);
        assert_eq!(URL_SAFE_NO_PAD.decode(&first).expect("valid base64").len(), TOKEN_BYTES);
        assert!(first.bytes().all(|b| b.is_ascii_graphic()));
    }

    #[test]
    fn read_only_methods_skip_the_check() {
        assert!(is_read_only(&Method::GET));
        assert!(is_read_only(&Method::HEAD));
        assert!(is_read_only(&Method::OPTIONS));
        assert!(!is_read_only(&Method::POST));
        assert!(!is_read_only(&Method::PUT));
        assert!(!is_read_only(&Method::DELETE));
    }
}
