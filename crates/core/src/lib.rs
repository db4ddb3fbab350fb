//! Pure domain logic for the stock taker: no database, no HTTP.

pub mod entry;
pub mod error;
pub mod import;
pub mod inventory;
pub mod rbac;
pub mod reporting;
pub mod types;
pub mod users;
pub mod visibility;
