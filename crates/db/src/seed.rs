//! Idempotent bootstrap data: built-in roles, the Admin account and master data.
//!
//! Safe to run on every deploy; existing rows are left alone except where
//! noted on [`run`].

use hermas_core::inventory::SESSION_STATUS_ACTIVE;
use hermas_core::rbac::{Permission, Scope};
use hermas_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{RoleGrants, RoleWrite};
use crate::models::user::CreateUser;
use crate::repositories::{CategoryRepo, InventorySessionRepo, MetricRepo, RoleRepo, UserRepo};

pub const ADMIN_ROLE_NAME: &str = "Admin";
pub const VIEW_ROLE_NAME: &str = "view";
pub const ADMIN_USERNAME: &str = "Admin";

/// Bootstrap password; stored hashed. Older databases may still hold it in plain text.
pub const ADMIN_DEFAULT_PASSWORD: &str = "adminthegreat";

pub const DEFAULT_METRICS: [&str; 4] = ["ltr", "kg", "gm", "nos"];

pub const DEFAULT_GROUPS: [(&str, &[&str]); 3] = [
    ("Raw Materials", &["Herbs", "Powders"]),
    (
        "Semi Finished Goods",
        &["Majun (Semi Finished)", "Roghan (Semi Finished)"],
    ),
    ("Finished Goods", &["Majun", "Syrup (Semi Finished)", "Roghan"]),
];

pub const DEFAULT_SESSION_CODE: &str = "2025-09";
pub const DEFAULT_SESSION_NAME: &str = "Sep-2025 Monthly";

/// What a seed run touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedReport {
    pub admin_role_id: DbId,
    pub admin_user_id: DbId,
    pub admin_created: bool,
    pub password_rehashed: bool,
    pub session_created: bool,
}

/// Seed the database.
///
/// - The admin role gets every permission; on first creation every scope is `org`.
///   Re-runs restore any missing permission but keep the configured scopes.
/// - The `Admin` user is created with `admin_password_hash`; a plaintext
///   legacy password is replaced by the hash.
/// - An inventory session is created only when none exist.
pub async fn run(pool: &PgPool, admin_password_hash: &str) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    let admin_role = match RoleRepo::find_admin(pool).await? {
        Some(mut role) => {
            if Permission::ALL.iter().any(|p| !role.has(*p)) {
                let mut grants = role.grants.clone();
                for permission in Permission::ALL {
                    grants.set_permission(permission, true);
                }
                let write = RoleWrite {
                    name: role.name.clone(),
                    grants,
                };
                if let Some(updated) = RoleRepo::update(pool, role.id, &write).await? {
                    role = updated;
                }
            }
            role
        }
        None => {
            RoleRepo::ensure(pool, ADMIN_ROLE_NAME, &RoleGrants::uniform(true, Scope::Org)).await?
        }
    };
    report.admin_role_id = admin_role.id;

    RoleRepo::ensure(pool, VIEW_ROLE_NAME, &RoleGrants::view_only()).await?;

    match UserRepo::find_by_username(pool, ADMIN_USERNAME).await? {
        Some(user) => {
            if user.password_hash.as_deref() == Some(ADMIN_DEFAULT_PASSWORD) {
                UserRepo::update_password(pool, user.id, admin_password_hash).await?;
                report.password_rehashed = true;
            }
            if user.role_id != admin_role.id {
                UserRepo::promote(pool, user.id, admin_role.id).await?;
            }
            report.admin_user_id = user.id;
        }
        None => {
            let user = UserRepo::create(
                pool,
                &CreateUser {
                    name: ADMIN_USERNAME.to_string(),
                    username: ADMIN_USERNAME.to_string(),
                    email: None,
                    password_hash: Some(admin_password_hash.to_string()),
                    invitation_token: None,
                    invited_by_id: None,
                    role_id: admin_role.id,
                    parent_admin_id: None,
                    dashboard_share_enabled: true,
                    is_active: true,
                },
            )
            .await?;
            report.admin_user_id = user.id;
            report.admin_created = true;
        }
    }

    for metric in DEFAULT_METRICS {
        MetricRepo::ensure(pool, metric).await?;
    }

    for (group_name, subs) in DEFAULT_GROUPS {
        let group = CategoryRepo::ensure_group(pool, group_name).await?;
        let mut conn = pool.acquire().await?;
        for sub in subs {
            CategoryRepo::find_or_create_in_group(&mut *conn, group.id, sub).await?;
        }
    }

    if InventorySessionRepo::count(pool).await? == 0 {
        InventorySessionRepo::create(
            pool,
            DEFAULT_SESSION_CODE,
            DEFAULT_SESSION_NAME,
            SESSION_STATUS_ACTIVE,
        )
        .await?;
        report.session_created = true;
    }

    tracing::info!(
        admin_user_id = report.admin_user_id,
        admin_created = report.admin_created,
        session_created = report.session_created,
        "Seed complete"
    );
    Ok(report)
}
