//! Request handlers for the stock taker API.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers check permissions through the extractors in
//! [`crate::middleware`], delegate to the repositories in `hermas_db` and
//! map errors via [`crate::error::AppError`].

pub mod auth;
pub mod bootstrap;
pub mod categories;
pub mod dashboard;
pub mod entries;
pub mod items;
pub mod metrics;
pub mod roles;
pub mod users;
pub mod warehouses;
