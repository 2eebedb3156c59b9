pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;

use api::create_api_router;
use auth::expose_rotated_tokens;
use axum::{Router, middleware};
use db::Database;
use jwt::TokenKeys;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Secret for signing access tokens
    pub access_secret: Vec<u8>,
    /// Secret for signing refresh tokens. Must differ from the access
    /// secret so one token kind never verifies as the other
    pub refresh_secret: Vec<u8>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let keys = Arc::new(TokenKeys::new(
        &config.access_secret,
        &config.refresh_secret,
    ));

    let api_router =
        create_api_router(config.db.clone(), keys).layer(middleware::from_fn(expose_rotated_tokens));

    Router::new().nest("/api", api_router)
}

/// Run the server on the given listener. This function blocks until the
/// server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
