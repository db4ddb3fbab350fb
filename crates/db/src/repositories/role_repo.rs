//! Repository for the `roles` table.

use hermas_core::rbac::{Permission, ScopeField, ROLE_ADMIN, ROLE_VIEW};
use hermas_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{Role, RoleGrants, RoleWrite};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, \
    can_view_dashboard, can_view_add_item, can_view_raw, can_view_sfg, can_view_fg, \
    can_view_manage_data, can_view_users, can_manage_users, can_manage_roles, \
    can_import_master_data, can_add_entry_raw, can_add_entry_sfg, can_add_entry_fg, \
    can_edit_entry_raw, can_edit_entry_sfg, can_edit_entry_fg, can_edit_manage_data, \
    can_edit_add_item, can_bulk_edit_delete_add_item, can_bulk_edit_delete_raw, \
    can_bulk_edit_delete_sfg, can_bulk_edit_delete_fg, can_export_dashboard_summary, \
    can_export_dashboard_entries, can_view_dashboard_cards, can_open_dashboard_modal, \
    dashboard_scope, add_item_scope, entry_scope, raw_scope, sfg_scope, fg_scope, \
    created_at, updated_at";

/// Grant column names in bind order: permissions first, then scopes.
fn grant_columns() -> Vec<&'static str> {
    Permission::ALL
        .iter()
        .map(|p| p.as_str())
        .chain(ScopeField::ALL.iter().map(|f| f.column()))
        .collect()
}

/// Provides CRUD operations for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Find a role by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by name, ignoring case.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE LOWER(name) = LOWER($1)");
        sqlx::query_as::<_, Role>(&query)
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }

    /// The built-in admin role, whose scopes are broadcast to everyone.
    pub async fn find_admin(pool: &PgPool) -> Result<Option<Role>, sqlx::Error> {
        Self::find_by_name(pool, ROLE_ADMIN).await
    }

    /// The built-in read-only role.
    pub async fn find_view(pool: &PgPool) -> Result<Option<Role>, sqlx::Error> {
        Self::find_by_name(pool, ROLE_VIEW).await
    }

    /// List all roles ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY name");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// Insert a role, returning the created row.
    pub async fn create(pool: &PgPool, input: &RoleWrite) -> Result<Role, sqlx::Error> {
        let columns = grant_columns();
        let placeholders: Vec<String> = (0..columns.len()).map(|i| format!("${}", i + 2)).collect();
        let query = format!(
            "INSERT INTO roles (name, {})
             VALUES ($1, {})
             RETURNING {COLUMNS}",
            columns.join(", "),
            placeholders.join(", ")
        );
        let mut q = sqlx::query_as::<_, Role>(&query).bind(&input.name);
        for permission in Permission::ALL {
            q = q.bind(input.grants.permission(permission));
        }
        for field in ScopeField::ALL {
            q = q.bind(input.grants.scope(field).as_str());
        }
        q.fetch_one(pool).await
    }

    /// Overwrite a role's name and every grant column.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &RoleWrite,
    ) -> Result<Option<Role>, sqlx::Error> {
        let assignments: Vec<String> = grant_columns()
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ${}", i + 3))
            .collect();
        let query = format!(
            "UPDATE roles SET name = $2, {}
             WHERE id = $1
             RETURNING {COLUMNS}",
            assignments.join(", ")
        );
        let mut q = sqlx::query_as::<_, Role>(&query).bind(id).bind(&input.name);
        for permission in Permission::ALL {
            q = q.bind(input.grants.permission(permission));
        }
        for field in ScopeField::ALL {
            q = q.bind(input.grants.scope(field).as_str());
        }
        q.fetch_optional(pool).await
    }

    /// Insert the role if no role with that name exists yet (case-insensitive).
    pub async fn ensure(
        pool: &PgPool,
        name: &str,
        grants: &RoleGrants,
    ) -> Result<Role, sqlx::Error> {
        if let Some(existing) = Self::find_by_name(pool, name).await? {
            return Ok(existing);
        }
        Self::create(
            pool,
            &RoleWrite {
                name: name.to_string(),
                grants: grants.clone(),
            },
        )
        .await
    }

    /// Delete a role by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of users assigned to the role.
    pub async fn count_users(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
