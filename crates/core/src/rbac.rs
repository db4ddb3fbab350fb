//! Role names, permission flags and broadcast scopes.
//!
//! Permission names double as column names on the `roles` table, so the
//! strings returned by [`Permission::as_str`] must match the migration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Role names
-------------------------------------------------------------------------- */

/// The built-in administrator role. Sees every row and every area.
pub const ROLE_ADMIN: &str = "admin";

/// The built-in read-only role.
pub const ROLE_VIEW: &str = "view";

/// Roles that can never be deleted or freely edited.
pub const PROTECTED_ROLE_NAMES: &[&str] = &[ROLE_ADMIN, ROLE_VIEW];

/// Classification of a role by its (case-insensitive) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Admin,
    View,
    Custom,
}

impl RoleKind {
    pub fn from_name(name: &str) -> Self {
        let folded = name.trim().to_lowercase();
        match folded.as_str() {
            ROLE_ADMIN => RoleKind::Admin,
            ROLE_VIEW => RoleKind::View,
            _ => RoleKind::Custom,
        }
    }

    pub fn is_protected(self) -> bool {
        !matches!(self, RoleKind::Custom)
    }
}

/* --------------------------------------------------------------------------
Permissions
-------------------------------------------------------------------------- */

/// A single boolean grant on a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    ViewDashboard,
    ViewAddItem,
    ViewRaw,
    ViewSfg,
    ViewFg,
    ViewManageData,
    ViewUsers,
    ManageUsers,
    ManageRoles,
    ImportMasterData,
    AddEntryRaw,
    AddEntrySfg,
    AddEntryFg,
    EditEntryRaw,
    EditEntrySfg,
    EditEntryFg,
    EditManageData,
    EditAddItem,
    BulkEditDeleteAddItem,
    BulkEditDeleteRaw,
    BulkEditDeleteSfg,
    BulkEditDeleteFg,
    ExportDashboardSummary,
    ExportDashboardEntries,
    ViewDashboardCards,
    OpenDashboardModal,
}

impl Permission {
    /// Every permission in column order.
    pub const ALL: [Permission; 26] = [
        Permission::ViewDashboard,
        Permission::ViewAddItem,
        Permission::ViewRaw,
        Permission::ViewSfg,
        Permission::ViewFg,
        Permission::ViewManageData,
        Permission::ViewUsers,
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ImportMasterData,
        Permission::AddEntryRaw,
        Permission::AddEntrySfg,
        Permission::AddEntryFg,
        Permission::EditEntryRaw,
        Permission::EditEntrySfg,
        Permission::EditEntryFg,
        Permission::EditManageData,
        Permission::EditAddItem,
        Permission::BulkEditDeleteAddItem,
        Permission::BulkEditDeleteRaw,
        Permission::BulkEditDeleteSfg,
        Permission::BulkEditDeleteFg,
        Permission::ExportDashboardSummary,
        Permission::ExportDashboardEntries,
        Permission::ViewDashboardCards,
        Permission::OpenDashboardModal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ViewDashboard => "can_view_dashboard",
            Permission::ViewAddItem => "can_view_add_item",
            Permission::ViewRaw => "can_view_raw",
            Permission::ViewSfg => "can_view_sfg",
            Permission::ViewFg => "can_view_fg",
            Permission::ViewManageData => "can_view_manage_data",
            Permission::ViewUsers => "can_view_users",
            Permission::ManageUsers => "can_manage_users",
            Permission::ManageRoles => "can_manage_roles",
            Permission::ImportMasterData => "can_import_master_data",
            Permission::AddEntryRaw => "can_add_entry_raw",
            Permission::AddEntrySfg => "can_add_entry_sfg",
            Permission::AddEntryFg => "can_add_entry_fg",
            Permission::EditEntryRaw => "can_edit_entry_raw",
            Permission::EditEntrySfg => "can_edit_entry_sfg",
            Permission::EditEntryFg => "can_edit_entry_fg",
            Permission::EditManageData => "can_edit_manage_data",
            Permission::EditAddItem => "can_edit_add_item",
            Permission::BulkEditDeleteAddItem => "can_bulk_edit_delete_add_item",
            Permission::BulkEditDeleteRaw => "can_bulk_edit_delete_raw",
            Permission::BulkEditDeleteSfg => "can_bulk_edit_delete_sfg",
            Permission::BulkEditDeleteFg => "can_bulk_edit_delete_fg",
            Permission::ExportDashboardSummary => "can_export_dashboard_summary",
            Permission::ExportDashboardEntries => "can_export_dashboard_entries",
            Permission::ViewDashboardCards => "can_view_dashboard_cards",
            Permission::OpenDashboardModal => "can_open_dashboard_modal",
        }
    }

    /// Value a freshly created custom role gets when the flag is omitted.
    ///
    /// Page visibility and the dashboard widgets default on; anything that
    /// mutates data or manages accounts defaults off.
    pub fn default_grant(self) -> bool {
        matches!(
            self,
            Permission::ViewDashboard
                | Permission::ViewAddItem
                | Permission::ViewRaw
                | Permission::ViewSfg
                | Permission::ViewFg
                | Permission::ViewManageData
                | Permission::ViewDashboardCards
                | Permission::OpenDashboardModal
        )
    }

    /// Flags granted to the built-in read-only role.
    pub fn is_view_flag(self) -> bool {
        matches!(
            self,
            Permission::ViewDashboard
                | Permission::ViewAddItem
                | Permission::ViewRaw
                | Permission::ViewSfg
                | Permission::ViewFg
                | Permission::ViewManageData
                | Permission::ViewDashboardCards
                | Permission::OpenDashboardModal
        )
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --------------------------------------------------------------------------
Scopes
-------------------------------------------------------------------------- */

/// How widely an area is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Users see only the rows they created.
    #[default]
    Own,
    /// Users see rows created by anyone.
    Org,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::Org => "org",
        }
    }

    /// Parse a stored or submitted scope value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_lowercase().as_str() {
            "own" => Ok(Scope::Own),
            "org" => Ok(Scope::Org),
            other => Err(CoreError::Validation(format!(
                "Invalid scope '{other}'. Must be one of: own, org"
            ))),
        }
    }

    /// Lenient parse used when reading rows; unknown values collapse to `own`.
    pub fn from_column(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

/// The areas whose visibility the admin role broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeField {
    Dashboard,
    AddItem,
    Entry,
    Raw,
    Sfg,
    Fg,
}

impl ScopeField {
    pub const ALL: [ScopeField; 6] = [
        ScopeField::Dashboard,
        ScopeField::AddItem,
        ScopeField::Entry,
        ScopeField::Raw,
        ScopeField::Sfg,
        ScopeField::Fg,
    ];

    /// Column name on the `roles` table.
    pub fn column(self) -> &'static str {
        match self {
            ScopeField::Dashboard => "dashboard_scope",
            ScopeField::AddItem => "add_item_scope",
            ScopeField::Entry => "entry_scope",
            ScopeField::Raw => "raw_scope",
            ScopeField::Sfg => "sfg_scope",
            ScopeField::Fg => "fg_scope",
        }
    }
}
