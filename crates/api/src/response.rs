//! Shared response body types for API handlers.

use serde::Serialize;

/// Body of a successful bulk delete.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
