//! Repository for the `users` table.

use hermas_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User, UserResponse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, username, email, password_hash, google_sub, invitation_token, \
                        invited_at, invited_by_id, role_id, parent_admin_id, \
                        dashboard_share_enabled, is_active, last_login_at, failed_login_count, \
                        locked_until, created_at, updated_at";

/// Columns for [`UserResponse`]; expects `users u JOIN roles r`.
const RESPONSE_COLUMNS: &str = "u.id, u.name, u.username, u.email, u.role_id, r.name AS role_name, \
                                 u.parent_admin_id, u.dashboard_share_enabled, u.is_active, \
                                 u.invitation_token, u.invited_at, \
                                 (u.google_sub IS NOT NULL) AS google_linked, \
                                 u.last_login_at, u.created_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// `invited_at` is stamped when an invitation token is supplied.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, username, email, password_hash, invitation_token,
                                invited_at, invited_by_id, role_id, parent_admin_id,
                                dashboard_share_enabled, is_active)
             VALUES ($1, $2, $3, $4, $5, CASE WHEN $5::TEXT IS NULL THEN NULL ELSE NOW() END,
                     $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.invitation_token)
            .bind(input.invited_by_id)
            .bind(input.role_id)
            .bind(input.parent_admin_id)
            .bind(input.dashboard_share_enabled)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username, ignoring case.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(username.trim())
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email, ignoring case.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Find the account linked to a Google subject identifier.
    pub async fn find_by_google_sub(
        pool: &PgPool,
        google_sub: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE google_sub = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(google_sub)
            .fetch_optional(pool)
            .await
    }

    /// Whether a username or email is already taken by another account.
    pub async fn identity_taken(
        pool: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM users
                WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($2)
             )",
        )
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Safe representation of a single user.
    pub async fn find_response(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by username.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             ORDER BY LOWER(u.username)"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                role_id = COALESCE($3, role_id),
                is_active = COALESCE($4, is_active),
                dashboard_share_enabled = COALESCE($5, dashboard_share_enabled)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.role_id)
            .bind(input.is_active)
            .bind(input.dashboard_share_enabled)
            .fetch_optional(pool)
            .await
    }

    /// Replace the invitation token and restamp `invited_at`.
    pub async fn set_invitation_token(
        pool: &PgPool,
        id: DbId,
        token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET invitation_token = $2, invited_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Link a Google account on first sign-in and consume the invitation.
    pub async fn link_google(
        pool: &PgPool,
        id: DbId,
        google_sub: &str,
        email: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                google_sub = $2,
                email = COALESCE(email, $3),
                invitation_token = NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(google_sub)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Force a user onto a role and reactivate it. Used for the superuser.
    pub async fn promote(pool: &PgPool, id: DbId, role_id: DbId) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET role_id = $2, is_active = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role_id)
            .fetch_one(pool)
            .await
    }

    /// Delete a user by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of stock entries authored by the user.
    pub async fn count_entries(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE user_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset the failure counter, clear the lock
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
