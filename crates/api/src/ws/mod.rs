//! WebSocket infrastructure for the live entry stream.
//!
//! Provides connection management, heartbeat pings, and the HTTP upgrade
//! handler mounted at `/api/v1/entries/stream`.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::entry_stream;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
