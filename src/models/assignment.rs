//! Assignment (volunteer history) model.
//!
//! An assignment is the write the matching screen performs once an admin
//! accepts a suggested match; it is keyed by (event, volunteer).

use serde::{Deserialize, Serialize};

/// Default time credited for an assignment when the client does not send one.
pub const DEFAULT_DURATION_MINUTES: i64 = 90;

/// A volunteer assigned to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub event_id: String,
    pub volunteer_id: String,
    pub date_utc: String,
    pub duration_minutes: i64,
}

/// Request body for assigning a volunteer to an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVolunteerRequest {
    pub volunteer_id: String,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
}

/// Response body for a successful assignment, matching the frontend
/// AssignVolunteerResponse interface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVolunteerResponse {
    pub volunteer_history_id: String,
    pub event_id: String,
    pub volunteer_id: String,
    pub date_utc: String,
    pub duration_minutes: i64,
}

impl From<Assignment> for AssignVolunteerResponse {
    fn from(a: Assignment) -> Self {
        Self {
            volunteer_history_id: a.id,
            event_id: a.event_id,
            volunteer_id: a.volunteer_id,
            date_utc: a.date_utc,
            duration_minutes: a.duration_minutes,
        }
    }
}
