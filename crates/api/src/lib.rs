//! Hermas stock taker API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! pages, WebSocket infrastructure) so integration tests and the binaries
//! can both access them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod response;
pub mod router;
pub mod routes;
pub mod spreadsheet;
pub mod state;
pub mod ws;
