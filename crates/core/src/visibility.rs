//! Row visibility rules.
//!
//! Admins see every row. Everyone else sees every row of an area only when
//! the admin role broadcasts that area with the `org` scope, and otherwise
//! only the rows they created. Editing and deleting is never broadcast.

use crate::entry::EntryType;
use crate::rbac::{Scope, ScopeField};
use crate::types::DbId;

/// Row filter to apply to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    All,
    OwnerOnly(DbId),
}

impl Visibility {
    /// `user_id` bind value for `($n::BIGINT IS NULL OR e.user_id = $n)` filters.
    pub fn owner_filter(self) -> Option<DbId> {
        match self {
            Visibility::All => None,
            Visibility::OwnerOnly(id) => Some(id),
        }
    }

    pub fn allows(self, owner_id: DbId) -> bool {
        match self {
            Visibility::All => true,
            Visibility::OwnerOnly(id) => id == owner_id,
        }
    }
}

/// Scopes currently broadcast by the admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastScopes {
    pub dashboard: Scope,
    pub add_item: Scope,
    pub entry: Scope,
    pub raw: Scope,
    pub sfg: Scope,
    pub fg: Scope,
}

impl BroadcastScopes {
    pub fn get(&self, field: ScopeField) -> Scope {
        match field {
            ScopeField::Dashboard => self.dashboard,
            ScopeField::AddItem => self.add_item,
            ScopeField::Entry => self.entry,
            ScopeField::Raw => self.raw,
            ScopeField::Sfg => self.sfg,
            ScopeField::Fg => self.fg,
        }
    }
}

/// The facts about the acting user that visibility depends on.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub user_id: DbId,
    pub is_admin: bool,
}

fn resolve(viewer: Viewer, broadcast: &BroadcastScopes, field: ScopeField) -> Visibility {
    if viewer.is_admin || broadcast.get(field) == Scope::Org {
        Visibility::All
    } else {
        Visibility::OwnerOnly(viewer.user_id)
    }
}

/// Filter for dashboard cards, tables, details and exports.
pub fn dashboard_visibility(viewer: Viewer, broadcast: &BroadcastScopes) -> Visibility {
    resolve(viewer, broadcast, ScopeField::Dashboard)
}

/// Filter for entry listings; the per-type scope wins, `entry_scope` covers untyped lists.
pub fn entry_view_visibility(
    viewer: Viewer,
    broadcast: &BroadcastScopes,
    entry_type: Option<EntryType>,
) -> Visibility {
    let field = entry_type.map_or(ScopeField::Entry, EntryType::scope_field);
    resolve(viewer, broadcast, field)
}

/// Filter for entry edits and deletes.
pub fn entry_edit_visibility(viewer: Viewer) -> Visibility {
    if viewer.is_admin {
        Visibility::All
    } else {
        Visibility::OwnerOnly(viewer.user_id)
    }
}
