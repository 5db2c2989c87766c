//! Event model matching the frontend Event interface.

use serde::{Deserialize, Serialize};

use super::Skill;

/// How urgently an event needs volunteers. Descriptive only; matching
/// never consults it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventUrgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl EventUrgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventUrgency::Low => "Low",
            EventUrgency::Medium => "Medium",
            EventUrgency::High => "High",
            EventUrgency::Critical => "Critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(EventUrgency::Low),
            "Medium" => Some(EventUrgency::Medium),
            "High" => Some(EventUrgency::High),
            "Critical" => Some(EventUrgency::Critical),
            _ => None,
        }
    }
}

/// A volunteer event needing skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    /// Non-empty for well-formed events; the matcher still tolerates an
    /// empty list (it scores 0).
    pub required_skills: Vec<Skill>,
    pub urgency: EventUrgency,
    /// RFC 3339 string.
    pub date: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

/// Request body for creating a new event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub required_skills: Vec<Skill>,
    #[serde(default)]
    pub urgency: EventUrgency,
    pub date: String,
}

/// Request body for updating an existing event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<Skill>>,
    #[serde(default)]
    pub urgency: Option<EventUrgency>,
    #[serde(default)]
    pub date: Option<String>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}
