//! HTTP-level tests for master data: inventory groups, sub-categories,
//! locations, units, items and the item spreadsheet import.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{
    body_json, build_test_app, delete_auth, get_auth, login_admin, post_json_auth,
    put_json_auth, send, user_with,
};
use hermas_core::rbac::Permission;
use rust_xlsxwriter::Workbook;
use sqlx::PgPool;

const BOUNDARY: &str = "hermas-test-boundary";

async fn group_id(pool: &PgPool, token: &str, name: &str) -> i64 {
    let json = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/categories/groups", token).await).await;
    json.as_array()
        .unwrap()
        .iter()
        .find(|g| g["name"] == name)
        .and_then(|g| g["id"].as_i64())
        .unwrap()
}

fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            match value.parse::<f64>() {
                Ok(n) => sheet.write(r as u32, c as u16, n).unwrap(),
                Err(_) => sheet.write(r as u32, c as u16, *value).unwrap(),
            };
        }
    }
    workbook.save_to_buffer().unwrap()
}

async fn upload(pool: &PgPool, token: &str, filename: &str, bytes: &[u8]) -> axum::response::Response {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/items/import")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(build_test_app(pool.clone()), request).await
}

// ---------------------------------------------------------------------------
// Groups and sub-categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_groups_are_fixed(pool: PgPool) {
    let admin = login_admin(&pool).await;

    let json = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/categories/groups", &admin).await).await;
    let names: Vec<&str> = json.as_array().unwrap().iter().filter_map(|g| g["name"].as_str()).collect();
    assert_eq!(names, ["Raw Materials", "Semi Finished Goods", "Finished Goods"]);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/categories/groups",
        &admin,
        serde_json::json!({ "name": "Packaging" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sub_category_lifecycle(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let raw = group_id(&pool, &admin, "Raw Materials").await;
    let fg = group_id(&pool, &admin, "Finished Goods").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/categories/subs",
        &admin,
        serde_json::json!({ "name": " Oils ", "group_id": raw }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["name"], "Oils");
    assert_eq!(created["group_name"], "Raw Materials");
    let id = created["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/categories/subs",
        &admin,
        serde_json::json!({ "name": "oils", "group_id": raw }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/categories/subs?group_id={raw}"),
        &admin,
    )
    .await;
    let subs = body_json(response).await;
    assert!(subs.as_array().unwrap().iter().all(|s| s["group_id"] == raw));
    assert!(subs.as_array().unwrap().iter().any(|s| s["name"] == "Oils"));

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/categories/subs/{id}"),
        &admin,
        serde_json::json!({ "group_id": fg }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["group_name"], "Finished Goods");

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/categories/subs/{id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(
        build_test_app(pool),
        &format!("/api/v1/categories/subs/{id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sub_category_rules(pool: PgPool) {
    let admin = login_admin(&pool).await;
    let (_, clerk) = user_with(&pool, "clerk", &[]).await;
    let raw = group_id(&pool, &admin, "Raw Materials").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/categories/subs",
        &clerk,
        serde_json::json!({ "name": "Oils", "group_id": raw }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/categories/subs",
        &admin,
        serde_json::json!({ "name": "Oils", "group_id": 999_999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/categories/subs",
        &admin,
        serde_json::json!({ "name": "   ", "group_id": raw }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Locations and units
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_locations_and_units(pool: PgPool) {
    let admin = login_admin(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/warehouses",
        &admin,
        serde_json::json!({ "name": "  Main Store " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let store = body_json(response).await;
    assert_eq!(store["name"], "Main Store");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/warehouses",
        &admin,
        serde_json::json!({ "name": "Main Store" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let units = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/metrics", &admin).await).await;
    let names: Vec<&str> = units.as_array().unwrap().iter().filter_map(|m| m["name"].as_str()).collect();
    for unit in ["ltr", "kg", "gm", "nos"] {
        assert!(names.contains(&unit), "missing seeded unit {unit}");
    }

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/metrics",
        &admin,
        serde_json::json!({ "name": "box" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let box_id = body_json(response).await["id"].as_i64().unwrap();

    let response = delete_auth(build_test_app(pool.clone()), &format!("/api/v1/metrics/{box_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let store_id = store["id"].as_i64().unwrap();
    let response = delete_auth(build_test_app(pool.clone()), &format!("/api/v1/warehouses/{store_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(build_test_app(pool), &format!("/api/v1/warehouses/{store_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_item_crud(pool: PgPool) {
    let admin = login_admin(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/items",
        &admin,
        serde_json::json!({ "name": " Ashwagandha ", "unit": "kg", "price": 120.5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = body_json(response).await;
    assert_eq!(item["name"], "Ashwagandha");
    let id = item["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/items",
        &admin,
        serde_json::json!({ "name": "Ashwagandha", "unit": "kg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/items",
        &admin,
        serde_json::json!({ "name": "Negative", "unit": "kg", "price": -1.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/items",
        &admin,
        serde_json::json!({ "name": "Orphan", "unit": "kg", "category_id": 999_999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/items/{id}"),
        &admin,
        serde_json::json!({ "price": 99.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["price"], 99.0);

    let found = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/items?q=ashwa", &admin).await).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let response = delete_auth(build_test_app(pool), &format!("/api/v1/items/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_item_writes_need_permissions(pool: PgPool) {
    common::seed(&pool).await;
    let (_, clerk) = user_with(&pool, "clerk", &[]).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/items",
        &clerk,
        serde_json::json!({ "name": "Sneaky", "unit": "kg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(build_test_app(pool), "/api/v1/items", &clerk).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_creates_then_updates(pool: PgPool) {
    common::seed(&pool).await;
    let (_, importer) = user_with(&pool, "importer", &[Permission::ImportMasterData]).await;

    let bytes = workbook(&[
        &["Item Name", "Group", "Sub Category", "Unit", "Price"],
        &["Ashwagandha", "Raw Materials", "Herbs", "kg", "120.5"],
        &["Triphala Churna", "Raw Materials", "Churna", "kg", "80"],
        &["Mystery", "Packaging", "Boxes", "nos", "1"],
        &[],
        &["", "Raw Materials", "Herbs", "kg", "5"],
        &["ashwagandha", "Raw Materials", "Herbs", "kg", "130"],
    ]);

    let response = upload(&pool, &importer, "master.xlsx", &bytes).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["filename"], "master.xlsx");
    assert_eq!(summary["created"], 2);
    assert_eq!(summary["updated"], 0);
    assert_eq!(summary["skipped"], 3);

    let items = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/items?q=ashwagandha", &importer).await).await;
    let item = &items.as_array().unwrap()[0];
    assert_eq!(item["price"], 130.0);
    assert_eq!(item["category_name"], "Herbs");
    assert_eq!(item["group_name"], "Raw Materials");

    // The new sub-category was created inside its group.
    let subs = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/categories/subs", &importer).await).await;
    assert!(subs
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["name"] == "Churna" && s["group_name"] == "Raw Materials"));

    let response = upload(&pool, &importer, "master.xlsx", &bytes).await;
    let summary = body_json(response).await;
    assert_eq!(summary["created"], 0);
    assert_eq!(summary["updated"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_rejects_bad_uploads(pool: PgPool) {
    let admin = login_admin(&pool).await;

    let response = upload(&pool, &admin, "master.csv", b"a,b,c").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = upload(&pool, &admin, "master.xlsx", b"not a workbook").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = workbook(&[&["Name", "Unit"], &["Ashwagandha", "kg"]]);
    let response = upload(&pool, &admin, "master.xlsx", &bytes).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("The first row must contain headers"));

    let bytes = workbook(&[
        &["Item Name", "Group", "Sub Category", "Unit", "Price"],
        &["Mystery", "Packaging", "", "nos", "1"],
    ]);
    let response = upload(&pool, &admin, "master.xlsx", &bytes).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
