//! Handler for `GET /bootstrap`: everything the pages need on load.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use hermas_core::rbac::{Permission, ScopeField};
use hermas_core::types::DbId;
use hermas_db::repositories::{CategoryRepo, InventorySessionRepo, MetricRepo, WarehouseRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub user: BootstrapUser,
    pub groups: Vec<NamedRef>,
    pub subcategories: Vec<SubCategoryRef>,
    pub metrics: Vec<NamedRef>,
    pub locations: Vec<NamedRef>,
    /// Same list as `locations`; older pages read this key.
    pub warehouses: Vec<NamedRef>,
    pub sessions: Vec<SessionRef>,
    pub superuser_email: String,
}

#[derive(Debug, Serialize)]
pub struct BootstrapUser {
    pub id: DbId,
    pub name: String,
    pub role: String,
    /// Effective permissions; admins hold every flag.
    pub permissions: BTreeMap<&'static str, bool>,
    pub dashboard_scope: &'static str,
    pub entry_scope: &'static str,
    pub share_scopes: ShareScopes,
}

#[derive(Debug, Serialize)]
pub struct ShareScopes {
    pub dashboard: &'static str,
    pub add_item: &'static str,
    pub raw: &'static str,
    pub sfg: &'static str,
    pub fg: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedRef {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SubCategoryRef {
    pub id: DbId,
    pub name: String,
    pub group_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct SessionRef {
    pub id: DbId,
    pub code: String,
    pub name: String,
}

/// GET /api/v1/bootstrap
pub async fn bootstrap(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<BootstrapResponse>> {
    let groups = CategoryRepo::list_core_groups(&state.pool).await?;
    let subs = CategoryRepo::list(&state.pool, None).await?;
    let metrics = MetricRepo::list(&state.pool).await?;
    let warehouses = WarehouseRepo::list(&state.pool).await?;
    let sessions = InventorySessionRepo::list(&state.pool).await?;

    let locations: Vec<NamedRef> = warehouses
        .into_iter()
        .map(|w| NamedRef { id: w.id, name: w.name })
        .collect();

    let grants = &user.role.grants;
    let scope = |field: ScopeField| grants.scope(field).as_str();

    Ok(Json(BootstrapResponse {
        user: BootstrapUser {
            id: user.user_id,
            name: user.name.clone(),
            role: user.role.name.clone(),
            permissions: Permission::ALL
                .iter()
                .map(|p| (p.as_str(), user.can(*p)))
                .collect(),
            dashboard_scope: scope(ScopeField::Dashboard),
            entry_scope: scope(ScopeField::Entry),
            share_scopes: ShareScopes {
                dashboard: scope(ScopeField::Dashboard),
                add_item: scope(ScopeField::AddItem),
                raw: scope(ScopeField::Raw),
                sfg: scope(ScopeField::Sfg),
                fg: scope(ScopeField::Fg),
            },
        },
        groups: groups
            .into_iter()
            .map(|g| NamedRef { id: g.id, name: g.name })
            .collect(),
        subcategories: subs
            .into_iter()
            .map(|s| SubCategoryRef {
                id: s.id,
                name: s.name,
                group_id: s.group_id,
            })
            .collect(),
        metrics: metrics
            .into_iter()
            .map(|m| NamedRef { id: m.id, name: m.name })
            .collect(),
        warehouses: locations.clone(),
        locations,
        sessions: sessions
            .into_iter()
            .map(|s| SessionRef {
                id: s.id,
                code: s.code,
                name: s.name,
            })
            .collect(),
        superuser_email: state.config.google.superuser_email.clone(),
    }))
}
