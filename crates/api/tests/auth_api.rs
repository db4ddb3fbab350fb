//! HTTP-level tests for sign-in: Google ID tokens, the password login of the
//! seeded Admin, refresh rotation, logout and account lockout.

mod common;

use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use common::{
    body_json, build_test_app, credential, get_auth, login_admin, post_json, post_json_auth,
    put_json_auth, SUPERUSER_EMAIL,
};
use hermas_db::repositories::{RoleRepo, UserRepo};
use hermas_db::seed::{ADMIN_DEFAULT_PASSWORD, ADMIN_USERNAME};
use sqlx::PgPool;

async fn invite(pool: &PgPool, admin_token: &str, email: &str) -> serde_json::Value {
    let view = RoleRepo::find_view(pool).await.unwrap().unwrap();
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/users",
        admin_token,
        serde_json::json!({ "email": email, "role_id": view.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn google_login(pool: &PgPool, sub: &str, email: &str) -> axum::response::Response {
    post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/google",
        serde_json::json!({ "credential": credential(sub, email) }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Password login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_password_login(pool: PgPool) {
    common::seed(&pool).await;
    let body = serde_json::json!({ "username": "admin", "password": ADMIN_DEFAULT_PASSWORD });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("hermas_session="));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["username"], ADMIN_USERNAME);
    assert_eq!(json["user"]["role"], "Admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_rejects_bad_credentials(pool: PgPool) {
    common::seed(&pool).await;

    let body = serde_json::json!({ "username": ADMIN_USERNAME, "password": "nope" });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five failures lock the account, after which even the right password is refused.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_lockout(pool: PgPool) {
    common::seed(&pool).await;

    for _ in 0..5 {
        let body = serde_json::json!({ "username": ADMIN_USERNAME, "password": "wrong" });
        let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let body = serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_DEFAULT_PASSWORD });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    common::seed(&pool).await;
    let body = serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_DEFAULT_PASSWORD });
    let login = body_json(post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await).await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), refresh_token);

    // The old refresh token was revoked by the rotation.
    let response = post_json(build_test_app(pool), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_session(pool: PgPool) {
    let token = login_admin(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/logout",
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let response = get_auth(build_test_app(pool), "/api/v1/bootstrap", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    let response = common::get(build_test_app(pool), "/api/v1/bootstrap").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Google sign-in
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_superuser_is_created_as_admin(pool: PgPool) {
    common::seed(&pool).await;

    let response = google_login(&pool, "owner-sub", SUPERUSER_EMAIL).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], SUPERUSER_EMAIL);
    assert_eq!(json["user"]["role"], "Admin");

    let user = UserRepo::find_by_google_sub(&pool, "owner-sub").await.unwrap().unwrap();
    assert!(user.is_active);
    assert!(user.last_login_at.is_some());

    // Signing in again reuses the account.
    let response = google_login(&pool, "owner-sub", SUPERUSER_EMAIL).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["id"], user.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_uninvited_google_account_is_forbidden(pool: PgPool) {
    common::seed(&pool).await;
    let response = google_login(&pool, "stranger", "stranger@gmail.com").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_google_credential_is_unauthorized(pool: PgPool) {
    common::seed(&pool).await;
    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/google",
        serde_json::json!({ "credential": "garbage" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// The first Google sign-in links the invitation; a different Google
/// account with the same address is refused afterwards.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invitation_is_accepted_once(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let invited = invite(&pool, &admin, "clerk@gmail.com").await;
    assert!(invited["invitation_token"].is_string());

    let response = google_login(&pool, "clerk-sub", "clerk@gmail.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["role"], "view");

    let user = UserRepo::find_by_email(&pool, "clerk@gmail.com").await.unwrap().unwrap();
    assert_eq!(user.google_sub.as_deref(), Some("clerk-sub"));
    assert!(user.invitation_token.is_none());

    let response = google_login(&pool, "other-sub", "clerk@gmail.com").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivated_google_user_is_forbidden(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let invited = invite(&pool, &admin, "leaver@gmail.com").await;
    let id = invited["id"].as_i64().unwrap();

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/users/{id}"),
        &admin,
        serde_json::json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = google_login(&pool, "leaver-sub", "leaver@gmail.com").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
