//! HTTP-level tests for role management (`/roles`).

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_role, create_user, delete_auth, get_auth, login_admin,
    post_json_auth, put_json_auth, user_with,
};
use hermas_core::rbac::Permission;
use hermas_db::repositories::RoleRepo;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_roles_require_manage_roles(pool: PgPool) {
    common::seed(&pool).await;
    let (_, clerk) = user_with(&pool, "clerk", &[Permission::ManageUsers]).await;

    let response = get_auth(build_test_app(pool), "/api/v1/roles", &clerk).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Custom roles keep their flags but always get `own` scopes and lose the
/// master-data edit flags.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_custom_role(pool: PgPool) {
    let admin = login_admin(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/roles",
        &admin,
        serde_json::json!({
            "name": " Counter ",
            "can_add_entry_raw": true,
            "can_edit_manage_data": true,
            "raw_scope": "org",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Counter");
    assert_eq!(json["can_add_entry_raw"], true);
    assert_eq!(json["can_edit_manage_data"], false);
    assert_eq!(json["raw_scope"], "own");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/roles",
        &admin,
        serde_json::json!({ "name": "counter" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/roles",
        &admin,
        serde_json::json!({ "name": "View" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Only the admin role's scopes may change; its flags and name are locked.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_role_updates(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let role = RoleRepo::find_admin(&pool).await.unwrap().unwrap();
    let uri = format!("/api/v1/roles/{}", role.id);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &admin,
        serde_json::json!({ "raw_scope": "own", "can_view_users": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["raw_scope"], "own");
    assert_eq!(json["dashboard_scope"], "org");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &admin,
        serde_json::json!({ "can_manage_roles": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &admin,
        serde_json::json!({ "raw_scope": "everyone" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool),
        &uri,
        &admin,
        serde_json::json!({ "name": "Boss" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_view_role_is_locked(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let view = RoleRepo::find_view(&pool).await.unwrap().unwrap();

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/roles/{}", view.id),
        &admin,
        serde_json::json!({ "can_add_entry_raw": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(
        build_test_app(pool),
        &format!("/api/v1/roles/{}", view.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_custom_role(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let counter = create_role(&pool, "Counter", &[]).await;
    create_role(&pool, "Auditor", &[]).await;
    let uri = format!("/api/v1/roles/{counter}");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &admin,
        serde_json::json!({ "name": "auditor" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &admin,
        serde_json::json!({ "name": "Stock Counter", "can_add_entry_fg": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Stock Counter");
    assert_eq!(json["can_add_entry_fg"], true);

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/roles/999999",
        &admin,
        serde_json::json!({ "name": "Ghost" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_role_in_use(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let used = create_role(&pool, "Used", &[]).await;
    create_user(&pool, "holder", used).await;
    let unused = create_role(&pool, "Unused", &[]).await;

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/roles/{used}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/roles/{unused}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(RoleRepo::find_by_id(&pool, unused).await.unwrap().is_none());
}
