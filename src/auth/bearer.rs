//! Credential extraction from the Authorization header and cookies.

use axum::http::{HeaderMap, header};

/// Cookie name for the access token (short-lived, 15 minutes).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived, 7 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Candidate tokens extracted from a request. Either side may be absent;
/// presence says nothing about validity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Credentials {
    /// Extract candidate tokens from request headers. Pure parse, no side
    /// effects.
    ///
    /// Recognized Authorization shapes, in order:
    /// 1. `Bearer <refresh>,<access>` - both sides trimmed, either may be empty
    /// 2. `Bearer <access>` - single token, access only
    ///
    /// The cookie fields `access_token` / `refresh_token` fill whichever side
    /// the header left empty.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut creds = Self::default();

        if let Some(payload) = bearer_payload(headers) {
            if payload.contains(',') {
                let mut parts = payload.split(',');
                creds.refresh = parts.next().and_then(non_empty);
                creds.access = parts.next().and_then(non_empty);
            } else {
                creds.access = non_empty(payload);
            }
        }

        if creds.access.is_none() {
            creds.access = get_cookie(headers, ACCESS_COOKIE_NAME).and_then(non_empty);
        }
        if creds.refresh.is_none() {
            creds.refresh = get_cookie(headers, REFRESH_COOKIE_NAME).and_then(non_empty);
        }

        creds
    }

    /// True when neither token was found in any source.
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// The part of the Authorization header after the "Bearer " prefix.
/// The scheme is matched case-insensitively; any other scheme is ignored.
fn bearer_payload(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    if auth.len() < 7 || !auth[..7].eq_ignore_ascii_case("bearer ") {
        return None;
    }
    Some(&auth[7..])
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}
