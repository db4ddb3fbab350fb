//! Server-rendered HTML pages.
//!
//! Pages read the session cookie through [`MaybeAuthUser`]: signed-out
//! visitors are redirected to `/login`, signed-in users without the page's
//! view flag get the 403 page. Data is rendered on the server; mutations go
//! through the JSON API.

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use hermas_core::entry::EntryType;
use hermas_core::rbac::Permission;
use hermas_core::reporting::{
    format_date_label, format_decimal_label, format_qty_text, or_placeholder,
};
use hermas_core::visibility::{dashboard_visibility, entry_view_visibility};
use hermas_db::repositories::{
    CategoryRepo, DashboardRepo, EntryRepo, ItemRepo, MetricRepo, RoleRepo, UserRepo,
    WarehouseRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// Page routes, mounted at the root next to `/static`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/dashboard", get(dashboard))
        .route("/add-item", get(add_item))
        .route("/raw-materials", get(raw_materials))
        .route("/semi-finished", get(semi_finished))
        .route("/finished-goods", get(finished_goods))
        .route("/manage-data", get(manage_data))
        .route("/users", get(users))
        .route("/roles", get(roles))
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Data every signed-in page hands to `base.html`.
pub struct Layout {
    pub title: &'static str,
    pub user_name: String,
    pub role_name: String,
    pub nav: Vec<NavLink>,
}

/// Sidebar entries with the flag each one needs.
const NAV: [(&str, &str, Permission); 8] = [
    ("/dashboard", "Dashboard", Permission::ViewDashboard),
    ("/add-item", "Add Item", Permission::ViewAddItem),
    ("/raw-materials", "Raw Materials", Permission::ViewRaw),
    ("/semi-finished", "Semi Finished", Permission::ViewSfg),
    ("/finished-goods", "Finished Goods", Permission::ViewFg),
    ("/manage-data", "Manage Data", Permission::ViewManageData),
    ("/users", "Users", Permission::ViewUsers),
    ("/roles", "Roles", Permission::ManageRoles),
];

impl Layout {
    fn new(user: &AuthUser, title: &'static str, current: &str) -> Self {
        let nav = NAV
            .iter()
            .filter(|(_, _, permission)| user.can(*permission))
            .map(|(href, label, _)| NavLink {
                href: *href,
                label: *label,
                active: *href == current,
            })
            .collect();
        Self {
            title,
            user_name: user.name.clone(),
            role_name: user.role.name.clone(),
            nav,
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub google_client_id: String,
    pub superuser_email: String,
}

#[derive(Template)]
#[template(path = "forbidden.html")]
pub struct ForbiddenTemplate {
    pub layout: Layout,
}

pub struct CardView {
    pub group_name: String,
    pub categories: i64,
    pub items: i64,
    pub counted: i64,
    pub total_value: String,
}

pub struct SummaryRowView {
    pub item_name: String,
    pub category: String,
    pub batches: i64,
    pub entries_logged: i64,
    pub total_qty: String,
    pub total_value: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub show_cards: bool,
    pub cards: Vec<CardView>,
    pub rows: Vec<SummaryRowView>,
}

pub struct ItemView {
    pub name: String,
    pub unit: String,
    pub group: String,
    pub category: String,
    pub price: String,
}

#[derive(Template)]
#[template(path = "add_item.html")]
pub struct AddItemTemplate {
    pub layout: Layout,
    pub items: Vec<ItemView>,
}

pub struct EntryView {
    pub date: String,
    pub item_name: String,
    pub qty: String,
    pub location: String,
    pub batch: String,
    pub mfg: String,
    pub exp: String,
    pub username: String,
}

#[derive(Template)]
#[template(path = "entries.html")]
pub struct EntriesTemplate {
    pub layout: Layout,
    pub entry_type: &'static str,
    pub can_add: bool,
    pub entries: Vec<EntryView>,
}

pub struct SubCategoryView {
    pub name: String,
    pub group_name: String,
}

#[derive(Template)]
#[template(path = "manage_data.html")]
pub struct ManageDataTemplate {
    pub layout: Layout,
    pub groups: Vec<String>,
    pub subcategories: Vec<SubCategoryView>,
    pub locations: Vec<String>,
    pub metrics: Vec<String>,
}

pub struct UserView {
    pub name: String,
    pub username: String,
    pub role_name: String,
    pub status: &'static str,
}

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub layout: Layout,
    pub can_manage: bool,
    pub users: Vec<UserView>,
}

pub struct RoleView {
    pub name: String,
    pub granted: usize,
    pub dashboard_scope: String,
}

#[derive(Template)]
#[template(path = "roles.html")]
pub struct RolesTemplate {
    pub layout: Layout,
    pub roles: Vec<RoleView>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /
async fn index(MaybeAuthUser(user): MaybeAuthUser) -> Redirect {
    match user {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}

/// GET /login
async fn login(MaybeAuthUser(user): MaybeAuthUser, State(state): State<AppState>) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    render(&LoginTemplate {
        google_client_id: state.config.google.client_id.clone(),
        superuser_email: state.config.google.superuser_email.clone(),
    })
}

/// GET /dashboard
async fn dashboard(maybe: MaybeAuthUser, State(state): State<AppState>) -> AppResult<Response> {
    let user = match gate(maybe, Permission::ViewDashboard, "Dashboard", "/dashboard") {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let owner = dashboard_visibility(user.viewer(), &user.broadcast).owner_filter();
    let show_cards = user.can(Permission::ViewDashboardCards);
    let cards = if show_cards {
        DashboardRepo::cards(&state.pool, owner)
            .await?
            .into_iter()
            .map(|c| CardView {
                group_name: c.group_name,
                categories: c.categories,
                items: c.items,
                counted: c.counted,
                total_value: money(c.total_value),
            })
            .collect()
    } else {
        Vec::new()
    };
    let rows = DashboardRepo::table(&state.pool, owner)
        .await?
        .into_iter()
        .map(|r| SummaryRowView {
            category: or_placeholder(r.category_name.as_deref()),
            total_qty: format_qty_text(r.total_qty, Some(r.unit.as_str())),
            total_value: money(r.total_value),
            item_name: r.item_name,
            batches: r.batches,
            entries_logged: r.entries_logged,
        })
        .collect();

    Ok(render(&DashboardTemplate {
        layout: Layout::new(&user, "Dashboard", "/dashboard"),
        show_cards,
        cards,
        rows,
    }))
}

/// GET /add-item
async fn add_item(maybe: MaybeAuthUser, State(state): State<AppState>) -> AppResult<Response> {
    let user = match gate(maybe, Permission::ViewAddItem, "Add Item", "/add-item") {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let items = ItemRepo::list(&state.pool, None)
        .await?
        .into_iter()
        .map(|i| ItemView {
            group: or_placeholder(i.group_name.as_deref()),
            category: or_placeholder(i.category_name.as_deref()),
            price: i.price.map(money).unwrap_or_else(|| or_placeholder(None)),
            name: i.name,
            unit: i.unit,
        })
        .collect();

    Ok(render(&AddItemTemplate {
        layout: Layout::new(&user, "Add Item", "/add-item"),
        items,
    }))
}

/// GET /raw-materials
async fn raw_materials(maybe: MaybeAuthUser, state: State<AppState>) -> AppResult<Response> {
    entries_page(maybe, state, EntryType::Raw, "Raw Materials", "/raw-materials").await
}

/// GET /semi-finished
async fn semi_finished(maybe: MaybeAuthUser, state: State<AppState>) -> AppResult<Response> {
    entries_page(maybe, state, EntryType::Sfg, "Semi Finished", "/semi-finished").await
}

/// GET /finished-goods
async fn finished_goods(maybe: MaybeAuthUser, state: State<AppState>) -> AppResult<Response> {
    entries_page(maybe, state, EntryType::Fg, "Finished Goods", "/finished-goods").await
}

async fn entries_page(
    maybe: MaybeAuthUser,
    State(state): State<AppState>,
    entry_type: EntryType,
    title: &'static str,
    path: &'static str,
) -> AppResult<Response> {
    let user = match gate(maybe, entry_type.view_permission(), title, path) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let visibility = entry_view_visibility(user.viewer(), &user.broadcast, Some(entry_type));
    let entries = EntryRepo::list(&state.pool, visibility.owner_filter(), Some(entry_type))
        .await?
        .into_iter()
        .map(|e| EntryView {
            date: format_date_label(e.entry_date),
            qty: format_qty_text(e.qty, Some(e.unit.as_str())),
            batch: or_placeholder(e.batch.as_deref()),
            mfg: or_placeholder(e.mfg.as_deref()),
            exp: or_placeholder(e.exp.as_deref()),
            item_name: e.item_name,
            location: e.warehouse_name,
            username: e.username,
        })
        .collect();

    Ok(render(&EntriesTemplate {
        layout: Layout::new(&user, title, path),
        entry_type: entry_type.as_str(),
        can_add: user.can(entry_type.add_permission()),
        entries,
    }))
}

/// GET /manage-data
async fn manage_data(maybe: MaybeAuthUser, State(state): State<AppState>) -> AppResult<Response> {
    let user = match gate(maybe, Permission::ViewManageData, "Manage Data", "/manage-data") {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let groups = CategoryRepo::list_core_groups(&state.pool)
        .await?
        .into_iter()
        .map(|g| g.name)
        .collect();
    let subcategories = CategoryRepo::list(&state.pool, None)
        .await?
        .into_iter()
        .map(|c| SubCategoryView {
            name: c.name,
            group_name: c.group_name,
        })
        .collect();
    let locations = WarehouseRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|w| w.name)
        .collect();
    let metrics = MetricRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|m| m.name)
        .collect();

    Ok(render(&ManageDataTemplate {
        layout: Layout::new(&user, "Manage Data", "/manage-data"),
        groups,
        subcategories,
        locations,
        metrics,
    }))
}

/// GET /users
async fn users(maybe: MaybeAuthUser, State(state): State<AppState>) -> AppResult<Response> {
    let user = match gate(maybe, Permission::ViewUsers, "Users", "/users") {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let users = UserRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|u| UserView {
            status: if !u.is_active {
                "Inactive"
            } else if u.invitation_pending() {
                "Invited"
            } else {
                "Active"
            },
            name: u.name,
            username: u.username,
            role_name: u.role_name,
        })
        .collect();

    Ok(render(&UsersTemplate {
        layout: Layout::new(&user, "Users", "/users"),
        can_manage: user.can(Permission::ManageUsers),
        users,
    }))
}

/// GET /roles
async fn roles(maybe: MaybeAuthUser, State(state): State<AppState>) -> AppResult<Response> {
    let user = match gate(maybe, Permission::ManageRoles, "Roles", "/roles") {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let roles = RoleRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|r| RoleView {
            granted: Permission::ALL.iter().filter(|p| r.has(**p)).count(),
            dashboard_scope: r.grants.dashboard_scope.clone(),
            name: r.name,
        })
        .collect();

    Ok(render(&RolesTemplate {
        layout: Layout::new(&user, "Roles", "/roles"),
        roles,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Signed-in user holding `permission`, or the response to send instead.
fn gate(
    maybe: MaybeAuthUser,
    permission: Permission,
    title: &'static str,
    path: &str,
) -> Result<AuthUser, Response> {
    let Some(user) = maybe.0 else {
        return Err(Redirect::to("/login").into_response());
    };
    if user.can(permission) {
        return Ok(user);
    }
    tracing::debug!(user_id = user.user_id, %permission, path, "Page access denied");
    let page = ForbiddenTemplate {
        layout: Layout::new(&user, title, path),
    };
    let mut response = render(&page);
    *response.status_mut() = StatusCode::FORBIDDEN;
    Err(response)
}

fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => AppError::InternalError(format!("Template rendering failed: {e}")).into_response(),
    }
}

fn money(value: f64) -> String {
    format!("₹{}", format_decimal_label(value, 2))
}
