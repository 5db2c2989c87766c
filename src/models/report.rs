//! Row types for CSV report exports.

use serde::Serialize;

/// One volunteer-activity row: an assignment joined with its volunteer
/// and event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerActivityRow {
    pub volunteer_name: String,
    pub volunteer_email: String,
    pub event_name: String,
    pub event_date: String,
    pub duration_minutes: i64,
    pub assigned_at: String,
}

/// One event-participation row: an event with aggregate assignment counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipationRow {
    pub event_name: String,
    pub event_date: String,
    pub location: String,
    pub urgency: String,
    pub volunteer_count: i64,
    pub total_minutes: i64,
}
