//! User entity model and DTOs.

use hermas_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash; NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub google_sub: Option<String>,
    pub invitation_token: Option<String>,
    pub invited_at: Option<Timestamp>,
    pub invited_by_id: Option<DbId>,
    pub role_id: DbId,
    pub parent_admin_id: Option<DbId>,
    pub dashboard_share_enabled: bool,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_locked(&self, now: Timestamp) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub role_id: DbId,
    /// Resolved role name (e.g. `"Admin"`, `"view"`).
    pub role_name: String,
    pub parent_admin_id: Option<DbId>,
    pub dashboard_share_enabled: bool,
    pub is_active: bool,
    /// Still set while the invitee has not signed in with Google.
    pub invitation_token: Option<String>,
    pub invited_at: Option<Timestamp>,
    pub google_linked: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserResponse {
    pub fn invitation_pending(&self) -> bool {
        self.invitation_token.is_some() && !self.google_linked
    }
}

/// Insert DTO for an invited (or seeded) account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub invitation_token: Option<String>,
    pub invited_by_id: Option<DbId>,
    pub role_id: DbId,
    pub parent_admin_id: Option<DbId>,
    pub dashboard_share_enabled: bool,
    pub is_active: bool,
}

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct InviteUser {
    pub email: String,
    pub name: Option<String>,
    pub role_id: DbId,
    #[serde(default)]
    pub dashboard_share_enabled: bool,
    /// An inactive invitation cannot be used until the user is activated.
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Request body for `PUT /users/{id}`. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
    pub dashboard_share_enabled: Option<bool>,
    #[serde(default)]
    pub regenerate_invitation: bool,
}

impl UpdateUser {
    /// Whether the payload touches anything besides the share and active flags.
    pub fn touches_restricted_fields(&self) -> bool {
        self.name.is_some() || self.role_id.is_some() || self.regenerate_invitation
    }
}
