//! End-to-end tests against the assembled router: login, token use,
//! rejection behavior, and the protected read-only endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::Algorithm;
use serde_json::Value;
use tower::ServiceExt;

use tollgate::prices::FixedPriceSource;
use tollgate::{
    build_router, AppState, Authenticator, CredentialStore, HashingCost, PasswordHasher,
    SessionGate, TokenCodec, UserRecord,
};

const SECRET: &str = "integration-test-signing-secret-0123456789abcdef0123456789";

fn test_app() -> Router {
    let hasher = PasswordHasher::new(HashingCost::fast()).unwrap();
    let store = Arc::new(
        CredentialStore::from_records([
            UserRecord::new("johndoe", hasher.hash("secret").unwrap())
                .with_full_name("John Doe")
                .with_email("johndoe@example.com"),
            UserRecord::new("alice", hasher.hash("secret2").unwrap()).disabled(),
        ])
        .unwrap(),
    );

    let codec = Arc::new(TokenCodec::new(
        SECRET,
        Algorithm::HS256,
        Duration::from_secs(1800),
    ));
    let channels = Arc::new(
        tollgate::channels::ChannelDirectory::from_json_str(
            r#"[{"id": 1, "name": "MyChannel", "tags": ["rust"], "description": "Systems programming"}]"#,
        )
        .unwrap(),
    );

    build_router(AppState {
        authenticator: Authenticator::new(store.clone(), hasher).unwrap(),
        gate: SessionGate::new(codec.clone(), store),
        codec,
        channels,
        prices: Arc::new(FixedPriceSource::new()),
        test_prices: Arc::new(FixedPriceSource::new()),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app.clone().oneshot(login_request(username, password)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    body["access_token"].as_str().unwrap().to_owned()
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn root_is_public() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"The server is running.");
}

#[tokio::test]
async fn login_then_fetch_own_profile() {
    let app = test_app();
    let token = login(&app, "johndoe", "secret").await;

    let response = app.oneshot(authed_get("/users/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "johndoe");
    assert_eq!(body["full_name"], "John Doe");
    assert_eq!(body["email"], "johndoe@example.com");
    assert_eq!(body["disabled"], false);
    // The stored hash never appears in any response.
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn login_failures_share_one_body() {
    let app = test_app();

    let unknown_user = app.clone().oneshot(login_request("mallory", "secret")).await.unwrap();
    let wrong_password = app.clone().oneshot(login_request("johndoe", "wrong")).await.unwrap();
    let disabled = app.clone().oneshot(login_request("alice", "secret2")).await.unwrap();

    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(disabled.status(), StatusCode::UNAUTHORIZED);

    // Unknown username, bad password, and disabled account must be
    // indistinguishable from the outside.
    let a = body_json(unknown_user).await;
    let b = body_json(wrong_password).await;
    let c = body_json(disabled).await;
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a["detail"], "incorrect username or password");
}

#[tokio::test]
async fn protected_route_requires_a_token() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/users/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    assert_eq!(body_json(response).await["detail"], "could not validate credentials");
}

#[tokio::test]
async fn garbage_token_is_rejected_with_a_challenge() {
    let app = test_app();
    let response = app
        .oneshot(authed_get("/users/me", "not.a.token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn wrong_auth_scheme_is_rejected() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_elsewhere_is_rejected() {
    let app = test_app();
    let foreign = TokenCodec::new(
        "some-other-service-signing-secret-abcdef0123456789abcdef01",
        Algorithm::HS256,
        Duration::from_secs(1800),
    );
    let token = foreign.issue("johndoe").unwrap();

    let response = app.oneshot(authed_get("/users/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "could not validate credentials");
}

#[tokio::test]
async fn channel_lookup_hit_and_miss() {
    let app = test_app();
    let token = login(&app, "johndoe", "secret").await;

    let hit = app.clone().oneshot(authed_get("/channels/1", &token)).await.unwrap();
    assert_eq!(hit.status(), StatusCode::OK);
    let body = body_json(hit).await;
    assert_eq!(body["name"], "MyChannel");
    assert_eq!(body["tags"][0], "rust");

    let miss = app.clone().oneshot(authed_get("/channels/99", &token)).await.unwrap();
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);

    // No token, no directory.
    let anonymous = app
        .oneshot(Request::builder().uri("/channels/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_price_endpoint_returns_the_fixed_quote() {
    let app = test_app();
    let token = login(&app, "johndoe", "secret").await;

    let response = app.oneshot(authed_get("/testprices/VWRL", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ticker"], "VWRL");
    assert_eq!(body["price"], "999");
    assert!(body["time"].as_str().unwrap().contains(','));
}
