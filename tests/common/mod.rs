#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use fleetgate::jwt::{AccessClaims, RefreshClaims};
use fleetgate::{ServerConfig, create_app, db::Database};
use jsonwebtoken::{EncodingKey, Header};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

pub const ACCESS_SECRET: &[u8] = b"test-access-signing-secret-0123456789";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-signing-secret-0123456789";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
}

pub async fn setup() -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");

    let config = ServerConfig {
        db: db.clone(),
        access_secret: ACCESS_SECRET.to_vec(),
        refresh_secret: REFRESH_SECRET.to_vec(),
    };

    TestApp {
        app: create_app(&config),
        db,
    }
}

impl TestApp {
    /// Create a principal directly in the store and return its uuid.
    pub async fn seed_principal(&self, username: &str) -> String {
        let uuid = uuid::Uuid::new_v4().to_string();
        self.db
            .principals()
            .create(&uuid, username)
            .await
            .expect("Failed to seed principal");
        uuid
    }

    /// The refresh token currently stored for a principal.
    pub async fn stored_refresh_token(&self, uuid: &str) -> Option<String> {
        self.db
            .principals()
            .get_by_uuid(uuid)
            .await
            .expect("Failed to load principal")
            .expect("Principal not found")
            .refresh_token
    }

    /// Send a request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }

    /// GET /api/principals/me with the given Authorization header value.
    pub async fn get_me(&self, authorization: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri("/api/principals/me")
                .header("authorization", authorization)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Hand-mint an access token with explicit time bounds, bypassing the
/// keyring, so tests can fabricate expired or forged tokens.
pub fn mint_access_token_at(secret: &[u8], sub: &str, iat: u64, exp: u64) -> String {
    let claims = AccessClaims {
        sub: sub.to_string(),
        iat,
        exp,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .expect("Failed to encode test token")
}

/// Hand-mint a refresh token with explicit time bounds and a fresh jti.
pub fn mint_refresh_token_at(sub: &str, iat: u64, exp: u64) -> String {
    let claims = RefreshClaims {
        jti: uuid::Uuid::new_v4().to_string(),
        sub: sub.to_string(),
        iat,
        exp,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(REFRESH_SECRET),
    )
    .expect("Failed to encode test token")
}

/// An access token for `sub` that expired a minute ago.
pub fn expired_access_token(sub: &str) -> String {
    mint_access_token_at(ACCESS_SECRET, sub, now() - 960, now() - 60)
}

/// A currently valid access token for `sub`.
pub fn valid_access_token(sub: &str) -> String {
    mint_access_token_at(ACCESS_SECRET, sub, now(), now() + 900)
}

/// A currently valid refresh token for `sub`.
pub fn valid_refresh_token(sub: &str) -> String {
    mint_refresh_token_at(sub, now() - 30, now() + 7 * 24 * 60 * 60)
}

/// An expired refresh token for `sub`.
pub fn expired_refresh_token(sub: &str) -> String {
    mint_refresh_token_at(sub, now() - 1000, now() - 1)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Body is not JSON")
}
