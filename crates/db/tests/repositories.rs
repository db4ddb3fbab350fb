//! Repository tests against a real database: master data, entries,
//! dashboard aggregates and the item import.

use assert_matches::assert_matches;
use chrono::Utc;
use hermas_core::entry::EntryType;
use hermas_core::import::ImportRow;
use hermas_db::models::entry::{CreateEntry, UpdateEntry};
use hermas_db::models::item::CreateItem;
use hermas_db::models::user::CreateUser;
use hermas_db::repositories::item_repo::ImportError;
use hermas_db::repositories::{
    CategoryRepo, DashboardRepo, EntryRepo, InventorySessionRepo, ItemRepo, RoleRepo, UserRepo,
    WarehouseRepo,
};
use hermas_db::seed;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    admin_id: i64,
    clerk_id: i64,
    session_id: i64,
    warehouse_id: i64,
    item_id: i64,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let report = seed::run(pool, "hash").await.unwrap();
    let view = RoleRepo::find_view(pool).await.unwrap().unwrap();
    let clerk = UserRepo::create(
        pool,
        &CreateUser {
            name: "Clerk".into(),
            username: "clerk@gmail.com".into(),
            email: Some("clerk@gmail.com".into()),
            password_hash: None,
            invitation_token: Some("tok".into()),
            invited_by_id: Some(report.admin_user_id),
            role_id: view.id,
            parent_admin_id: Some(report.admin_user_id),
            dashboard_share_enabled: false,
            is_active: true,
        },
    )
    .await
    .unwrap();
    let session_id = InventorySessionRepo::active_ids(pool).await.unwrap()[0];
    let warehouse = WarehouseRepo::create(pool, "Main Store").await.unwrap();
    let herbs = CategoryRepo::list(pool, None)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Herbs")
        .unwrap();
    let item = ItemRepo::create(
        pool,
        &CreateItem {
            name: "Ashwagandha".into(),
            unit: "kg".into(),
            price: Some(100.0),
            category_id: Some(herbs.id),
        },
    )
    .await
    .unwrap();
    Fixture {
        admin_id: report.admin_user_id,
        clerk_id: clerk.id,
        session_id,
        warehouse_id: warehouse.id,
        item_id: item.id,
    }
}

fn entry(f: &Fixture, qty: f64, batch: &str, price: Option<f64>) -> CreateEntry {
    CreateEntry {
        session_id: f.session_id,
        item_id: f.item_id,
        category_id: None,
        entry_type: EntryType::Raw,
        unit: "kg".into(),
        qty,
        warehouse_id: f.warehouse_id,
        batch: Some(batch.into()),
        price_at_entry: price,
        mfg: None,
        exp: None,
        entry_date: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invited_user_is_stamped(pool: PgPool) {
    let f = fixture(&pool).await;
    let clerk = UserRepo::find_by_id(&pool, f.clerk_id).await.unwrap().unwrap();
    assert!(clerk.invited_at.is_some());

    let found = UserRepo::find_by_email(&pool, "CLERK@gmail.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(f.clerk_id));

    let linked = UserRepo::link_google(&pool, f.clerk_id, "sub-1", "clerk@gmail.com")
        .await
        .unwrap();
    assert_eq!(linked.google_sub.as_deref(), Some("sub-1"));
    assert!(linked.invitation_token.is_none());

    let response = UserRepo::find_response(&pool, f.clerk_id).await.unwrap().unwrap();
    assert!(response.google_linked);
    assert_eq!(response.role_name, "view");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entry_list_respects_owner_filter(pool: PgPool) {
    let f = fixture(&pool).await;
    let now = Utc::now();
    EntryRepo::create(&pool, &entry(&f, 2.0, "B1", None), f.admin_id, now)
        .await
        .unwrap();
    EntryRepo::create(&pool, &entry(&f, 3.0, "B2", None), f.clerk_id, now)
        .await
        .unwrap();

    let all = EntryRepo::list(&pool, None, Some(EntryType::Raw)).await.unwrap();
    assert_eq!(all.len(), 2);

    let own = EntryRepo::list(&pool, Some(f.clerk_id), None).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].username, "clerk@gmail.com");
    assert_eq!(own[0].entry_type, EntryType::Raw);

    let fg = EntryRepo::list(&pool, None, Some(EntryType::Fg)).await.unwrap();
    assert!(fg.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entry_update_and_bulk_delete(pool: PgPool) {
    let f = fixture(&pool).await;
    let a = EntryRepo::create(&pool, &entry(&f, 1.0, "B1", None), f.admin_id, Utc::now())
        .await
        .unwrap();
    let b = EntryRepo::create(&pool, &entry(&f, 1.0, "B2", None), f.admin_id, Utc::now())
        .await
        .unwrap();

    let updated = EntryRepo::update(
        &pool,
        a.id,
        &UpdateEntry {
            qty: Some(7.25),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.qty, 7.25);
    assert_eq!(updated.batch.as_deref(), Some("B1"));

    let removed = EntryRepo::delete_many(&pool, &[a.id, b.id]).await.unwrap();
    assert_eq!(removed, 2);
    assert!(EntryRepo::find_by_id(&pool, a.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_aggregates(pool: PgPool) {
    let f = fixture(&pool).await;
    let now = Utc::now();
    EntryRepo::create(&pool, &entry(&f, 2.0, "B1", Some(50.0)), f.admin_id, now)
        .await
        .unwrap();
    EntryRepo::create(&pool, &entry(&f, 3.0, "B2", None), f.clerk_id, now)
        .await
        .unwrap();

    let cards = DashboardRepo::cards(&pool, None).await.unwrap();
    let raw = cards.iter().find(|c| c.group_name == "Raw Materials").unwrap();
    assert_eq!(raw.categories, 2);
    assert_eq!(raw.items, 1);
    assert_eq!(raw.counted, 1);
    // 2 x 50 (entry price) + 3 x 100 (item price)
    assert_eq!(raw.total_value, 400.0);

    let own_cards = DashboardRepo::cards(&pool, Some(f.clerk_id)).await.unwrap();
    let raw = own_cards.iter().find(|c| c.group_name == "Raw Materials").unwrap();
    assert_eq!(raw.total_value, 300.0);

    let table = DashboardRepo::table(&pool, None).await.unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].batches, 2);
    assert_eq!(table[0].entries_logged, 2);
    assert_eq!(table[0].total_qty, 5.0);

    let totals = DashboardRepo::item_totals(&pool, f.item_id, Some(f.admin_id))
        .await
        .unwrap();
    assert_eq!(totals.entries_logged, 1);

    let page = DashboardRepo::item_lines_page(&pool, f.item_id, None, 1, 0)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].category_name.as_deref(), Some("Herbs"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_items_put_counted_items_first(pool: PgPool) {
    let f = fixture(&pool).await;
    ItemRepo::create(
        &pool,
        &CreateItem {
            name: "Almond".into(),
            unit: "kg".into(),
            price: None,
            category_id: None,
        },
    )
    .await
    .unwrap();
    EntryRepo::create(&pool, &entry(&f, 1.0, "B1", None), f.admin_id, Utc::now())
        .await
        .unwrap();

    let rows = DashboardRepo::export_items(&pool, None, None).await.unwrap();
    assert_eq!(rows[0].item_name, "Ashwagandha");
    assert!(rows[0].has_entries());
    assert_eq!(rows[1].item_name, "Almond");
    assert!(!rows[1].has_entries());

    let other_session = InventorySessionRepo::create(&pool, "2025-10", "Oct", "closed")
        .await
        .unwrap();
    let lines = DashboardRepo::export_lines(&pool, None, Some(&[other_session.id]))
        .await
        .unwrap();
    assert!(lines.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_apply_import_creates_and_updates(pool: PgPool) {
    let f = fixture(&pool).await;
    let rows = vec![
        ImportRow {
            item_name: "ASHWAGANDHA".into(),
            group_name: "Raw Materials".into(),
            sub_category: Some("Roots".into()),
            unit: "gm".into(),
            price: Some(12.5),
        },
        ImportRow {
            item_name: "Majun Khas".into(),
            group_name: "Finished Goods".into(),
            sub_category: None,
            unit: "nos".into(),
            price: None,
        },
    ];

    let counts = ItemRepo::apply_import(&pool, &rows).await.unwrap();
    assert_eq!(counts.created, 1);
    assert_eq!(counts.updated, 1);

    let item = ItemRepo::find_by_id(&pool, f.item_id).await.unwrap().unwrap();
    assert_eq!(item.name, "Ashwagandha");
    assert_eq!(item.unit, "gm");
    assert_eq!(item.price, Some(12.5));
    assert_eq!(item.category_name.as_deref(), Some("Roots"));
    assert_eq!(item.group_name.as_deref(), Some("Raw Materials"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_apply_import_rolls_back_on_unknown_group(pool: PgPool) {
    seed::run(&pool, "hash").await.unwrap();
    sqlx::query("DELETE FROM category_groups WHERE name = 'Finished Goods'")
        .execute(&pool)
        .await
        .unwrap();

    let rows = vec![
        ImportRow {
            item_name: "Clove".into(),
            group_name: "Raw Materials".into(),
            sub_category: None,
            unit: "kg".into(),
            price: None,
        },
        ImportRow {
            item_name: "Syrup".into(),
            group_name: "Finished Goods".into(),
            sub_category: None,
            unit: "nos".into(),
            price: None,
        },
    ];
    let result = ItemRepo::apply_import(&pool, &rows).await;
    assert_matches!(result, Err(ImportError::UnknownGroup(_)));
    assert!(ItemRepo::list(&pool, Some("clove")).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_names_violate_uq_indexes(pool: PgPool) {
    seed::run(&pool, "hash").await.unwrap();
    let group = CategoryRepo::list_core_groups(&pool).await.unwrap()[0].clone();
    CategoryRepo::create(&pool, "Tonics", group.id).await.unwrap();
    let err = CategoryRepo::create(&pool, "TONICS", group.id).await.unwrap_err();
    let constraint = err
        .as_database_error()
        .and_then(|e| e.constraint())
        .map(str::to_string);
    assert_eq!(constraint.as_deref(), Some("uq_categories_group_name"));

    assert!(CategoryRepo::name_taken(&pool, group.id, "tonics", None)
        .await
        .unwrap());
}
