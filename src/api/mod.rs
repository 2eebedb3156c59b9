mod error;
mod principals;
mod sessions;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::TokenKeys;

/// Create the API router.
pub fn create_api_router(db: Database, keys: Arc<TokenKeys>) -> Router {
    let principals_state = principals::PrincipalsState {
        db: db.clone(),
        keys: keys.clone(),
    };

    let sessions_state = sessions::SessionsState { db, keys };

    Router::new()
        .nest("/principals", principals::router(principals_state))
        .nest("/sessions", sessions::router(sessions_state))
}
