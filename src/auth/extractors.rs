//! The authentication gate: admits, admits-with-rotation, or rejects every
//! protected request.
//!
//! Fast path: a valid access token admits immediately, without touching the
//! principal store and without adding response headers. Only when the access
//! token is expired (well-signed, past its expiry) does the refresh path run:
//! the presented refresh token must verify *and* match the principal's stored
//! copy byte for byte, after which a new pair is minted and the new refresh
//! token replaces the stored one in a single write.
//!
//! Rotation is compare-then-replace with no cross-request lock. Two
//! concurrent refreshes for the same principal can both pass the compare
//! before either write lands; whichever write lands last wins, and the
//! loser's freshly minted refresh token will fail the compare on its next
//! use. Accepted trade-off (last-writer-wins), kept as is.

use std::cell::RefCell;

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::error;

use super::bearer::Credentials;
use super::errors::AuthError;
use super::state::HasAuthBackend;
use crate::jwt::TokenError;

/// Response header carrying the newly minted access token after a rotation.
pub const NEW_ACCESS_TOKEN_HEADER: &str = "x-new-access-token";

/// Response header carrying the newly minted refresh token after a rotation.
pub const NEW_REFRESH_TOKEN_HEADER: &str = "x-new-refresh-token";

tokio::task_local! {
    /// Task-local slot for a rotated token pair.
    /// The gate fills it during extraction; `expose_rotated_tokens` drains it
    /// into response headers once the handler has run.
    pub static ROTATED_TOKENS: RefCell<Option<RotatedTokens>>;
}

/// A freshly rotated pair waiting to be attached to the response.
#[derive(Debug, Clone)]
pub struct RotatedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// The principal a request was admitted as, available to downstream
/// handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    /// Principal UUID from the admitted token
    pub principal_uuid: String,
}

/// Extractor for endpoints behind the gate.
///
/// Routes using this must sit under a `middleware::from_fn(expose_rotated_tokens)`
/// layer, or rotated pairs are dropped instead of reaching the client.
pub struct Auth(pub AuthenticatedPrincipal);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_request(parts, state).await.map(Auth)
    }
}

/// Gate orchestration: parse credentials, try the access fast path, fall
/// through to refresh rotation only on expiry.
async fn authenticate_request<S>(
    parts: &Parts,
    state: &S,
) -> Result<AuthenticatedPrincipal, AuthError>
where
    S: HasAuthBackend + Send + Sync,
{
    let creds = Credentials::from_headers(&parts.headers);

    if creds.is_empty() {
        return Err(AuthError::NoCredentials);
    }

    if let Some(access) = creds.access.as_deref() {
        match state.keys().verify_access_token(access) {
            Ok(claims) => {
                return Ok(AuthenticatedPrincipal {
                    principal_uuid: claims.sub,
                });
            }
            // Expiry is the only outcome allowed to fall through to the
            // refresh path; a bad signature rejects even if a refresh
            // token is present.
            Err(TokenError::Expired) => {}
            Err(_) => return Err(AuthError::InvalidToken),
        }
    }

    let refresh = creds.refresh.as_deref().ok_or(AuthError::Unauthenticated)?;

    rotate_refresh_token(state, refresh).await
}

/// Refresh path: verify the presented token, compare it byte for byte with
/// the stored one, then mint and persist a replacement pair. Every failing
/// step is terminal for the request; nothing is retried.
async fn rotate_refresh_token<S>(
    state: &S,
    presented: &str,
) -> Result<AuthenticatedPrincipal, AuthError>
where
    S: HasAuthBackend + Send + Sync,
{
    let claims = state
        .keys()
        .verify_refresh_token(presented)
        .map_err(|_| AuthError::InvalidRefresh)?;

    let principal = state
        .db()
        .principals()
        .get_by_uuid(&claims.sub)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load principal for refresh");
            AuthError::AuthenticationFailed
        })?
        .ok_or(AuthError::InvalidRefresh)?;

    // A superseded refresh token still carries a valid signature; only the
    // stored copy is current.
    match principal.refresh_token.as_deref() {
        Some(stored) if stored == presented => {}
        _ => return Err(AuthError::InvalidRefresh),
    }

    let access = state
        .keys()
        .mint_access_token(&principal.uuid)
        .map_err(|e| {
            error!(error = %e, "Failed to mint access token");
            AuthError::AuthenticationFailed
        })?;
    let refresh = state
        .keys()
        .mint_refresh_token(&principal.uuid)
        .map_err(|e| {
            error!(error = %e, "Failed to mint refresh token");
            AuthError::AuthenticationFailed
        })?;

    // Single write keyed by principal id. The old token stops matching
    // exactly when this lands; there is no window with zero valid tokens.
    let updated = state
        .db()
        .principals()
        .set_refresh_token(&principal.uuid, &refresh.token)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to persist rotated refresh token");
            AuthError::AuthenticationFailed
        })?;

    if !updated {
        // Principal row disappeared between the read and the write
        return Err(AuthError::InvalidRefresh);
    }

    let _ = ROTATED_TOKENS.try_with(|cell| {
        cell.borrow_mut().replace(RotatedTokens {
            access_token: access.token,
            refresh_token: refresh.token,
        });
    });

    Ok(AuthenticatedPrincipal {
        principal_uuid: principal.uuid,
    })
}

/// Middleware that scopes the rotation slot around a request and copies any
/// rotated pair onto the response as `x-new-access-token` /
/// `x-new-refresh-token` so the client can persist the new credentials.
pub async fn expose_rotated_tokens(request: Request, next: Next) -> Response {
    ROTATED_TOKENS
        .scope(RefCell::new(None), async move {
            let mut response = next.run(request).await;

            let rotated = ROTATED_TOKENS.with(|cell| cell.borrow_mut().take());
            if let Some(tokens) = rotated {
                let headers = response.headers_mut();
                if let Ok(value) = HeaderValue::from_str(&tokens.access_token) {
                    headers.insert(NEW_ACCESS_TOKEN_HEADER, value);
                }
                if let Ok(value) = HeaderValue::from_str(&tokens.refresh_token) {
                    headers.insert(NEW_REFRESH_TOKEN_HEADER, value);
                }
            }

            response
        })
        .await
}
