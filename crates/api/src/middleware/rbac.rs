//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement, so authorization is visible in handler signatures.
//! Checks that depend on the request body (the entry type, for instance) use
//! [`AuthUser::require`] inside the handler instead.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hermas_core::rbac::Permission;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the built-in admin role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::forbidden("Admin role required"));
        }
        Ok(RequireAdmin(user))
    }
}

/// Declares an extractor that requires a single permission flag.
macro_rules! require_permission {
    ($($(#[$doc:meta])* $name:ident => $permission:expr;)+) => {
        $(
            $(#[$doc])*
            pub struct $name(pub AuthUser);

            impl FromRequestParts<AppState> for $name {
                type Rejection = AppError;

                async fn from_request_parts(
                    parts: &mut Parts,
                    state: &AppState,
                ) -> Result<Self, Self::Rejection> {
                    let user = AuthUser::from_request_parts(parts, state).await?;
                    user.require($permission)?;
                    Ok($name(user))
                }
            }
        )+
    };
}

require_permission! {
    /// Requires `can_manage_users`.
    RequireManageUsers => Permission::ManageUsers;
    /// Requires `can_manage_roles`.
    RequireManageRoles => Permission::ManageRoles;
    /// Requires `can_edit_manage_data`.
    RequireEditManageData => Permission::EditManageData;
    /// Requires `can_import_master_data`.
    RequireImportMasterData => Permission::ImportMasterData;
    /// Requires `can_bulk_edit_delete_add_item`.
    RequireItemDelete => Permission::BulkEditDeleteAddItem;
    /// Requires `can_export_dashboard_entries`.
    RequireEntriesExport => Permission::ExportDashboardEntries;
}
