//! Session issuance and teardown.
//!
//! - POST `/` - mint an access/refresh pair for a principal and persist the
//!   refresh token as the current one. This is the token-issuance half of
//!   login; credential verification (password, OAuth) happens upstream of
//!   this service and is not carried here.
//! - DELETE `/` - clear the stored refresh token (logout), leaving no valid
//!   refresh token for the principal.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::{ApiError, ResultExt};
use crate::auth::Auth;
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::TokenKeys;

#[derive(Clone)]
pub struct SessionsState {
    pub db: Database,
    pub keys: Arc<TokenKeys>,
}

impl_has_auth_backend!(SessionsState);

pub fn router(state: SessionsState) -> Router {
    Router::new()
        .route("/", post(create_session).delete(delete_session))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateSessionRequest {
    username: String,
}

#[derive(Serialize)]
struct CreateSessionResponse {
    access_token: String,
    refresh_token: String,
    /// Access token lifetime in seconds
    expires_in: u64,
}

async fn create_session(
    State(state): State<SessionsState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state
        .db
        .principals()
        .get_by_username(payload.username.trim())
        .await
        .db_err("Failed to load principal")?
        .ok_or_else(|| ApiError::not_found("Principal not found"))?;

    let access = state.keys.mint_access_token(&principal.uuid).map_err(|e| {
        error!(error = %e, "Failed to mint access token");
        ApiError::internal("Failed to mint tokens")
    })?;
    let refresh = state
        .keys
        .mint_refresh_token(&principal.uuid)
        .map_err(|e| {
            error!(error = %e, "Failed to mint refresh token");
            ApiError::internal("Failed to mint tokens")
        })?;

    // Any previously issued refresh token stops matching here
    state
        .db
        .principals()
        .set_refresh_token(&principal.uuid, &refresh.token)
        .await
        .db_err("Failed to persist refresh token")?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: access.duration,
        }),
    ))
}

#[derive(Serialize)]
struct DeleteSessionResponse {
    cleared: bool,
}

async fn delete_session(
    State(state): State<SessionsState>,
    Auth(principal): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let cleared = state
        .db
        .principals()
        .clear_refresh_token(&principal.principal_uuid)
        .await
        .db_err("Failed to clear refresh token")?;

    Ok(Json(DeleteSessionResponse { cleared }))
}
