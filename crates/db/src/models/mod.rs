//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod category;
pub mod dashboard;
pub mod entry;
pub mod inventory_session;
pub mod item;
pub mod metric;
pub mod role;
pub mod session;
pub mod user;
pub mod warehouse;
