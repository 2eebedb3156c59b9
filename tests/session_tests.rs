//! Session lifecycle: registration, token issuance, logout, and how issued
//! credentials behave at the gate afterwards.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::expired_access_token;

fn create_principal_request(username: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/principals")
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"username": "{}"}}"#, username)))
        .unwrap()
}

fn create_session_request(username: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"username": "{}"}}"#, username)))
        .unwrap()
}

#[tokio::test]
async fn test_create_principal() {
    let t = common::setup().await;

    let response = t.send(create_principal_request("alice")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = common::body_json(response).await;
    assert_eq!(json["username"], "alice");
    assert!(json["uuid"].as_str().is_some());
}

#[tokio::test]
async fn test_create_principal_invalid_username() {
    let t = common::setup().await;

    let response = t.send(create_principal_request("")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t.send(create_principal_request("alice@bob")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let long_name = "a".repeat(33);
    let response = t.send(create_principal_request(&long_name)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_principal_duplicate() {
    let t = common::setup().await;

    let response = t.send(create_principal_request("alice")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = t.send(create_principal_request("alice")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_issues_pair_and_persists_refresh() {
    let t = common::setup().await;
    let uuid = t.seed_principal("bob").await;

    let response = t.send(create_session_request("bob")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = common::body_json(response).await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();
    assert_eq!(json["expires_in"], 900);

    // The issued refresh token is now the principal's current one
    assert_eq!(t.stored_refresh_token(&uuid).await, Some(refresh));

    // The issued access token admits at the gate
    let me = t.get_me(&format!("Bearer {}", access)).await;
    assert_eq!(me.status(), StatusCode::OK);
    let json = common::body_json(me).await;
    assert_eq!(json["uuid"], uuid.as_str());
}

#[tokio::test]
async fn test_login_unknown_principal() {
    let t = common::setup().await;

    let response = t.send(create_session_request("nobody")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_supersedes_previous_refresh_token() {
    let t = common::setup().await;
    let uuid = t.seed_principal("carol").await;

    let first = common::body_json(t.send(create_session_request("carol")).await).await;
    let first_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let second = common::body_json(t.send(create_session_request("carol")).await).await;
    let second_refresh = second["refresh_token"].as_str().unwrap().to_string();

    assert_ne!(first_refresh, second_refresh);
    assert_eq!(
        t.stored_refresh_token(&uuid).await,
        Some(second_refresh.clone())
    );

    // Only the latest refresh token survives at the gate
    let stale = t
        .get_me(&format!(
            "Bearer {},{}",
            first_refresh,
            expired_access_token(&uuid)
        ))
        .await;
    assert_eq!(stale.status(), StatusCode::FORBIDDEN);

    let current = t
        .get_me(&format!(
            "Bearer {},{}",
            second_refresh,
            expired_access_token(&uuid)
        ))
        .await;
    assert_eq!(current.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_issued_refresh_token_rotates_at_the_gate() {
    let t = common::setup().await;
    let uuid = t.seed_principal("dave").await;

    let session = common::body_json(t.send(create_session_request("dave")).await).await;
    let refresh = session["refresh_token"].as_str().unwrap().to_string();

    let response = t
        .get_me(&format!(
            "Bearer {},{}",
            refresh,
            expired_access_token(&uuid)
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let rotated = response
        .headers()
        .get("x-new-refresh-token")
        .expect("missing rotation header")
        .to_str()
        .unwrap()
        .to_string();
    assert_ne!(rotated, refresh);
    assert_eq!(t.stored_refresh_token(&uuid).await, Some(rotated));
}

#[tokio::test]
async fn test_logout_clears_stored_refresh_token() {
    let t = common::setup().await;
    let uuid = t.seed_principal("erin").await;

    let session = common::body_json(t.send(create_session_request("erin")).await).await;
    let access = session["access_token"].as_str().unwrap().to_string();
    let refresh = session["refresh_token"].as_str().unwrap().to_string();

    let response = t
        .send(
            Request::builder()
                .method("DELETE")
                .uri("/api/sessions")
                .header("authorization", format!("Bearer {}", access))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["cleared"], true);

    assert_eq!(t.stored_refresh_token(&uuid).await, None);

    // The previously issued refresh token no longer matches anything
    let stale = t
        .get_me(&format!(
            "Bearer {},{}",
            refresh,
            expired_access_token(&uuid)
        ))
        .await;
    assert_eq!(stale.status(), StatusCode::FORBIDDEN);
    let json = common::body_json(stale).await;
    assert_eq!(json["error"], "Invalid refresh token");
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let t = common::setup().await;

    let response = t
        .send(
            Request::builder()
                .method("DELETE")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "bad request no header provided");
}
