//! Hermas entry change events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`EntryEvent`]: what happened to which entry, plus the JSON sent to
//!   live dashboard subscribers.
//! - [`Subscription`]: a receiver that drops the oldest events when it
//!   falls behind instead of failing.

pub mod bus;

pub use bus::{EntryEvent, EntryEventKind, EventBus, Subscription};
