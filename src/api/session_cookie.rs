// src/api/session_cookie.rs — Opaque per-browser session id in a cookie

use axum::http::header::{HeaderName, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};

const MAX_SESSION_ID_LEN: usize = 64;

/// Extract the session id from the `Cookie` header, ignoring malformed values.
pub fn read_session_id(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| is_valid_session_id(value))
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `Set-Cookie` header pinning the session id to this browser.
pub fn set_cookie_header(cookie_name: &str, session_id: &str) -> Option<(HeaderName, HeaderValue)> {
    let value = format!("{cookie_name}={session_id}; Path=/; HttpOnly; SameSite=Lax");
    HeaderValue::from_str(&value).ok().map(|v| (SET_COOKIE, v))
}
