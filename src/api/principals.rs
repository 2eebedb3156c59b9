//! Principal registration and the authenticated profile endpoint.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::Auth;
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::TokenKeys;

#[derive(Clone)]
pub struct PrincipalsState {
    pub db: Database,
    pub keys: Arc<TokenKeys>,
}

impl_has_auth_backend!(PrincipalsState);

pub fn router(state: PrincipalsState) -> Router {
    Router::new()
        .route("/", post(create_principal))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreatePrincipalRequest {
    username: String,
}

#[derive(Serialize)]
struct CreatePrincipalResponse {
    uuid: String,
    username: String,
}

async fn create_principal(
    State(state): State<PrincipalsState>,
    Json(payload): Json<CreatePrincipalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();

    if username.is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }

    if username.len() > 32 {
        return Err(ApiError::bad_request(
            "Username cannot be longer than 32 characters",
        ));
    }

    // Only allow alphanumeric and underscores
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ApiError::bad_request(
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    let available = state
        .db
        .principals()
        .is_username_available(username)
        .await
        .db_err("Failed to check username availability")?;

    if !available {
        return Err(ApiError::conflict("Username is already taken"));
    }

    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .principals()
        .create(&uuid, username)
        .await
        .db_err("Failed to create principal")?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePrincipalResponse {
            uuid,
            username: username.to_string(),
        }),
    ))
}

#[derive(Serialize)]
struct MeResponse {
    uuid: String,
    username: String,
}

/// Authenticated probe: echoes the principal the gate attached to the
/// request.
async fn me(
    State(state): State<PrincipalsState>,
    Auth(principal): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .db
        .principals()
        .get_by_uuid(&principal.principal_uuid)
        .await
        .db_err("Failed to load principal")?
        .ok_or_else(|| ApiError::not_found("Principal not found"))?;

    Ok(Json(MeResponse {
        uuid: record.uuid,
        username: record.username,
    }))
}
