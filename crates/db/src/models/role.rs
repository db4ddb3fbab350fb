//! Role entity model, DTOs and the protection rules for built-in roles.

use hermas_core::error::CoreError;
use hermas_core::inventory::normalize_name;
use hermas_core::rbac::{Permission, RoleKind, Scope, ScopeField};
use hermas_core::types::{DbId, Timestamp};
use hermas_core::visibility::BroadcastScopes;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Declares the grant struct, its patch DTO and the flag <-> [`Permission`]
/// mapping from a single field list so the three can never drift apart.
macro_rules! role_grants {
    ($($field:ident => $perm:ident),+ $(,)?) => {
        /// Permission flags and broadcast scopes stored on a role row.
        #[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
        pub struct RoleGrants {
            $(pub $field: bool,)+
            pub dashboard_scope: String,
            pub add_item_scope: String,
            pub entry_scope: String,
            pub raw_scope: String,
            pub sfg_scope: String,
            pub fg_scope: String,
        }

        /// Partial grants from a create/update payload. Omitted fields are `None`.
        #[derive(Debug, Clone, Default, Deserialize)]
        pub struct RoleGrantsPatch {
            $(pub $field: Option<bool>,)+
            pub dashboard_scope: Option<String>,
            pub add_item_scope: Option<String>,
            pub entry_scope: Option<String>,
            pub raw_scope: Option<String>,
            pub sfg_scope: Option<String>,
            pub fg_scope: Option<String>,
        }

        impl RoleGrants {
            pub fn permission(&self, permission: Permission) -> bool {
                match permission {
                    $(Permission::$perm => self.$field,)+
                }
            }

            pub fn set_permission(&mut self, permission: Permission, value: bool) {
                match permission {
                    $(Permission::$perm => self.$field = value,)+
                }
            }
        }

        impl RoleGrantsPatch {
            pub fn permission(&self, permission: Permission) -> Option<bool> {
                match permission {
                    $(Permission::$perm => self.$field,)+
                }
            }
        }
    };
}

role_grants! {
    can_view_dashboard => ViewDashboard,
    can_view_add_item => ViewAddItem,
    can_view_raw => ViewRaw,
    can_view_sfg => ViewSfg,
    can_view_fg => ViewFg,
    can_view_manage_data => ViewManageData,
    can_view_users => ViewUsers,
    can_manage_users => ManageUsers,
    can_manage_roles => ManageRoles,
    can_import_master_data => ImportMasterData,
    can_add_entry_raw => AddEntryRaw,
    can_add_entry_sfg => AddEntrySfg,
    can_add_entry_fg => AddEntryFg,
    can_edit_entry_raw => EditEntryRaw,
    can_edit_entry_sfg => EditEntrySfg,
    can_edit_entry_fg => EditEntryFg,
    can_edit_manage_data => EditManageData,
    can_edit_add_item => EditAddItem,
    can_bulk_edit_delete_add_item => BulkEditDeleteAddItem,
    can_bulk_edit_delete_raw => BulkEditDeleteRaw,
    can_bulk_edit_delete_sfg => BulkEditDeleteSfg,
    can_bulk_edit_delete_fg => BulkEditDeleteFg,
    can_export_dashboard_summary => ExportDashboardSummary,
    can_export_dashboard_entries => ExportDashboardEntries,
    can_view_dashboard_cards => ViewDashboardCards,
    can_open_dashboard_modal => OpenDashboardModal,
}

impl Default for RoleGrants {
    /// Column defaults: view pages on, everything else off, every scope `own`.
    fn default() -> Self {
        let mut grants = Self::uniform(false, Scope::Own);
        for permission in Permission::ALL {
            grants.set_permission(permission, permission.default_grant());
        }
        grants
    }
}

impl RoleGrants {
    /// Every flag set to `value` and every scope set to `scope`.
    pub fn uniform(value: bool, scope: Scope) -> Self {
        let s = scope.as_str().to_string();
        Self {
            can_view_dashboard: value,
            can_view_add_item: value,
            can_view_raw: value,
            can_view_sfg: value,
            can_view_fg: value,
            can_view_manage_data: value,
            can_view_users: value,
            can_manage_users: value,
            can_manage_roles: value,
            can_import_master_data: value,
            can_add_entry_raw: value,
            can_add_entry_sfg: value,
            can_add_entry_fg: value,
            can_edit_entry_raw: value,
            can_edit_entry_sfg: value,
            can_edit_entry_fg: value,
            can_edit_manage_data: value,
            can_edit_add_item: value,
            can_bulk_edit_delete_add_item: value,
            can_bulk_edit_delete_raw: value,
            can_bulk_edit_delete_sfg: value,
            can_bulk_edit_delete_fg: value,
            can_export_dashboard_summary: value,
            can_export_dashboard_entries: value,
            can_view_dashboard_cards: value,
            can_open_dashboard_modal: value,
            dashboard_scope: s.clone(),
            add_item_scope: s.clone(),
            entry_scope: s.clone(),
            raw_scope: s.clone(),
            sfg_scope: s.clone(),
            fg_scope: s,
        }
    }

    /// Grants of the built-in read-only role.
    pub fn view_only() -> Self {
        let mut grants = Self::uniform(false, Scope::Own);
        for permission in Permission::ALL {
            grants.set_permission(permission, permission.is_view_flag());
        }
        grants
    }

    pub fn scope(&self, field: ScopeField) -> Scope {
        let raw = match field {
            ScopeField::Dashboard => &self.dashboard_scope,
            ScopeField::AddItem => &self.add_item_scope,
            ScopeField::Entry => &self.entry_scope,
            ScopeField::Raw => &self.raw_scope,
            ScopeField::Sfg => &self.sfg_scope,
            ScopeField::Fg => &self.fg_scope,
        };
        Scope::from_column(raw)
    }

    pub fn set_scope(&mut self, field: ScopeField, scope: Scope) {
        let value = scope.as_str().to_string();
        match field {
            ScopeField::Dashboard => self.dashboard_scope = value,
            ScopeField::AddItem => self.add_item_scope = value,
            ScopeField::Entry => self.entry_scope = value,
            ScopeField::Raw => self.raw_scope = value,
            ScopeField::Sfg => self.sfg_scope = value,
            ScopeField::Fg => self.fg_scope = value,
        }
    }

    pub fn broadcast_scopes(&self) -> BroadcastScopes {
        BroadcastScopes {
            dashboard: self.scope(ScopeField::Dashboard),
            add_item: self.scope(ScopeField::AddItem),
            entry: self.scope(ScopeField::Entry),
            raw: self.scope(ScopeField::Raw),
            sfg: self.scope(ScopeField::Sfg),
            fg: self.scope(ScopeField::Fg),
        }
    }

    fn apply_permissions(&mut self, patch: &RoleGrantsPatch) {
        for permission in Permission::ALL {
            if let Some(value) = patch.permission(permission) {
                self.set_permission(permission, value);
            }
        }
    }

    fn apply_scopes(&mut self, patch: &RoleGrantsPatch) -> Result<(), CoreError> {
        for field in ScopeField::ALL {
            if let Some(raw) = patch.scope(field) {
                self.set_scope(field, Scope::parse(raw)?);
            }
        }
        Ok(())
    }

    /// Custom roles never broadcast and never edit shared master data.
    fn force_custom_defaults(&mut self) {
        for field in ScopeField::ALL {
            self.set_scope(field, Scope::Own);
        }
        self.can_edit_add_item = false;
        self.can_edit_manage_data = false;
    }
}

impl RoleGrantsPatch {
    pub fn scope(&self, field: ScopeField) -> Option<&str> {
        match field {
            ScopeField::Dashboard => self.dashboard_scope.as_deref(),
            ScopeField::AddItem => self.add_item_scope.as_deref(),
            ScopeField::Entry => self.entry_scope.as_deref(),
            ScopeField::Raw => self.raw_scope.as_deref(),
            ScopeField::Sfg => self.sfg_scope.as_deref(),
            ScopeField::Fg => self.fg_scope.as_deref(),
        }
    }
}

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub grants: RoleGrants,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        RoleKind::from_name(&self.name)
    }

    pub fn is_admin(&self) -> bool {
        self.kind() == RoleKind::Admin
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.grants.permission(permission)
    }
}

/// DTO for `POST /roles`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
    #[serde(flatten)]
    pub grants: RoleGrantsPatch,
}

/// DTO for `PUT /roles/{id}`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    #[serde(flatten)]
    pub grants: RoleGrantsPatch,
}

/// Name and grants to persist, produced by the planners below.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleWrite {
    pub name: String,
    pub grants: RoleGrants,
}

/// Validate a new role against the reserved names and fill in defaults.
pub fn plan_role_create(input: &CreateRole) -> Result<RoleWrite, CoreError> {
    let name = normalize_name(&input.name, "Role name")?;
    let kind = RoleKind::from_name(&name);
    if kind == RoleKind::View {
        return Err(CoreError::Validation(
            "The reserved view role already exists.".to_string(),
        ));
    }

    let mut grants = RoleGrants::default();
    grants.apply_permissions(&input.grants);
    grants.apply_scopes(&input.grants)?;
    if !kind.is_protected() {
        grants.force_custom_defaults();
    }
    Ok(RoleWrite { name, grants })
}

/// Apply an update to an existing role.
///
/// - The `view` role is immutable and no role may be renamed to `view`.
/// - The `admin` role keeps its name and flags; only its broadcast scopes change.
///   Resending a flag with its current value is accepted.
/// - Custom roles ignore submitted scopes and always get the custom defaults.
pub fn plan_role_update(current: &Role, input: &UpdateRole) -> Result<RoleWrite, CoreError> {
    if let Some(name) = &input.name {
        if RoleKind::from_name(name) == RoleKind::View {
            return Err(CoreError::Validation(
                "View-only role name is reserved.".to_string(),
            ));
        }
    }

    let mut grants = current.grants.clone();
    match current.kind() {
        RoleKind::View => Err(CoreError::Validation(
            "View-only role permissions are locked.".to_string(),
        )),
        RoleKind::Admin => {
            if let Some(name) = &input.name {
                if name.trim().to_lowercase() != current.name.to_lowercase() {
                    return Err(CoreError::Validation(
                        "Admin role name cannot be changed.".to_string(),
                    ));
                }
            }
            for permission in Permission::ALL {
                if let Some(value) = input.grants.permission(permission) {
                    if value != current.grants.permission(permission) {
                        return Err(CoreError::Validation(
                            "Admin role permissions are locked.".to_string(),
                        ));
                    }
                }
            }
            grants.apply_scopes(&input.grants)?;
            Ok(RoleWrite {
                name: current.name.clone(),
                grants,
            })
        }
        RoleKind::Custom => {
            let name = match &input.name {
                Some(n) => normalize_name(n, "Role name")?,
                None => current.name.clone(),
            };
            grants.apply_permissions(&input.grants);
            if !RoleKind::from_name(&name).is_protected() {
                grants.force_custom_defaults();
            }
            Ok(RoleWrite { name, grants })
        }
    }
}

/// Reject deletes of the built-in roles.
pub fn ensure_role_deletable(role: &Role) -> Result<(), CoreError> {
    if role.kind().is_protected() {
        return Err(CoreError::Validation(
            "Protected roles cannot be deleted.".to_string(),
        ));
    }
    Ok(())
}
