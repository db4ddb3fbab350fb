//! Primitive aliases shared by every crate.

/// Primary key of every table (`BIGSERIAL`).
pub type DbId = i64;

/// Stored and compared in UTC; pages format it for display.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
