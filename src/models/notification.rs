//! Notification model matching the frontend Notification interface.

use serde::{Deserialize, Serialize};

/// A message for a volunteer, e.g. an assignment confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub volunteer_id: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

/// Response body for the mark-all-read operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
