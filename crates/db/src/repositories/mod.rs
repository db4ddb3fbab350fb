//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a transaction connection) as the first argument.

pub mod category_repo;
pub mod dashboard_repo;
pub mod entry_repo;
pub mod inventory_session_repo;
pub mod item_repo;
pub mod metric_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod warehouse_repo;

pub use category_repo::CategoryRepo;
pub use dashboard_repo::DashboardRepo;
pub use entry_repo::EntryRepo;
pub use inventory_session_repo::InventorySessionRepo;
pub use item_repo::ItemRepo;
pub use metric_repo::MetricRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use warehouse_repo::WarehouseRepo;
