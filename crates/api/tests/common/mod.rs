#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use hermas_api::auth::google::{GoogleIdentity, IdentityError, IdentityVerifier};
use hermas_api::auth::jwt::JwtConfig;
use hermas_api::auth::password::hash_password;
use hermas_api::config::{GoogleConfig, ServerConfig};
use hermas_api::router::build_app_router;
use hermas_api::state::AppState;
use hermas_api::ws::WsManager;
use hermas_core::rbac::Permission;
use hermas_core::types::DbId;
use hermas_db::models::role::{RoleGrants, RoleWrite};
use hermas_db::models::user::CreateUser;
use hermas_db::repositories::{RoleRepo, UserRepo};
use hermas_db::seed::{self, ADMIN_DEFAULT_PASSWORD, ADMIN_USERNAME};
use hermas_events::EventBus;

pub const SUPERUSER_EMAIL: &str = "owner@gmail.com";
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        cookie_secure: false,
        entry_event_queue_size: 16,
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        jwt: JwtConfig {
            secret: "test-session-secret".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
        google: GoogleConfig {
            client_id: "test-client.apps.googleusercontent.com".to_string(),
            superuser_email: SUPERUSER_EMAIL.to_string(),
            allowed_domain: "gmail.com".to_string(),
            jwks_url: "http://127.0.0.1:9/certs".to_string(),
        },
    }
}

/// Accepts credentials of the form `sub|email|name`; anything else is invalid.
pub struct StubVerifier;

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, IdentityError> {
        let mut parts = credential.split('|');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(sub), Some(email), name) if !sub.is_empty() && !email.is_empty() => {
                Ok(GoogleIdentity {
                    sub: sub.to_string(),
                    email: email.to_lowercase(),
                    name: name.map(str::to_string),
                })
            }
            _ => Err(IdentityError::InvalidToken("malformed".into())),
        }
    }
}

/// Google credential understood by [`StubVerifier`].
pub fn credential(sub: &str, email: &str) -> String {
    format!("{sub}|{email}|Test User")
}

pub fn test_state(pool: PgPool) -> AppState {
    let config = test_config();
    AppState {
        pool,
        event_bus: Arc::new(EventBus::new(config.entry_event_queue_size)),
        config: Arc::new(config),
        ws_manager: Arc::new(WsManager::new()),
        identity: Arc::new(StubVerifier),
    }
}

/// The production router and middleware stack over a test database.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = test_state(pool);
    let config = Arc::clone(&state.config);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Seed the database; the Admin password is the default one.
pub async fn seed(pool: &PgPool) -> seed::SeedReport {
    let hash = hash_password(ADMIN_DEFAULT_PASSWORD).expect("hashing should succeed");
    seed::run(pool, &hash).await.expect("seeding should succeed")
}

/// Seed and log in as the built-in Admin; returns the session token.
pub async fn login_admin(pool: &PgPool) -> String {
    seed(pool).await;
    login(pool, ADMIN_USERNAME, ADMIN_DEFAULT_PASSWORD).await
}

pub async fn login(pool: &PgPool, username: &str, password: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 200, "login as {username} should succeed");
    body_json(response).await["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}

/// A custom role: page views on (the column defaults) plus `extra`.
pub async fn create_role(pool: &PgPool, name: &str, extra: &[Permission]) -> DbId {
    let mut grants = RoleGrants::default();
    for permission in extra {
        grants.set_permission(*permission, true);
    }
    RoleRepo::create(
        pool,
        &RoleWrite {
            name: name.to_string(),
            grants,
        },
    )
    .await
    .expect("role creation should succeed")
    .id
}

/// A password user under the seeded Admin.
pub async fn create_user(pool: &PgPool, username: &str, role_id: DbId) -> DbId {
    let admin = UserRepo::find_by_username(pool, ADMIN_USERNAME)
        .await
        .unwrap()
        .expect("seed before creating users");
    let hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            name: username.to_string(),
            username: username.to_string(),
            email: Some(format!("{username}@gmail.com")),
            password_hash: Some(hash),
            invitation_token: None,
            invited_by_id: Some(admin.id),
            role_id,
            parent_admin_id: Some(admin.id),
            dashboard_share_enabled: false,
            is_active: true,
        },
    )
    .await
    .expect("user creation should succeed")
    .id
}

/// Create a user with a custom role and log them in.
pub async fn user_with(pool: &PgPool, username: &str, permissions: &[Permission]) -> (DbId, String) {
    let role_id = create_role(pool, &format!("{username}-role"), permissions).await;
    let user_id = create_user(pool, username, role_id).await;
    let token = login(pool, username, TEST_PASSWORD).await;
    (user_id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Page request carrying the session cookie instead of a bearer token.
pub async fn get_with_cookie(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("hermas_session={token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("body should be UTF-8")
}
