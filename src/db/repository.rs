//! Database repository for CRUD operations.
//!
//! Uses prepared statements and conditional version checks for data integrity.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Assignment, CreateEventRequest, CreateVolunteerRequest, Datastore, Event,
    EventParticipationRow, EventUrgency, Notification, RevisionInfo, Skill, UpdateEventRequest,
    UpdateVolunteerRequest, Volunteer, VolunteerActivityRow,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Get the full datastore.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let volunteers = self.list_volunteers().await?;
        let events = self.list_events().await?;
        let notifications = self.list_notifications(None).await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            volunteers,
            events,
            notifications: Some(notifications),
        })
    }

    // ==================== VOLUNTEER OPERATIONS ====================

    /// List all volunteers.
    pub async fn list_volunteers(&self) -> Result<Vec<Volunteer>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, email, skills, interests, availability, active, updated_at, version FROM volunteers ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(volunteer_from_row).collect())
    }

    /// List volunteers eligible for matching.
    pub async fn list_active_volunteers(&self) -> Result<Vec<Volunteer>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, email, skills, interests, availability, active, updated_at, version FROM volunteers WHERE active = 1 ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(volunteer_from_row).collect())
    }

    /// Get a volunteer by ID.
    pub async fn get_volunteer(&self, id: &str) -> Result<Option<Volunteer>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, email, skills, interests, availability, active, updated_at, version FROM volunteers WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(volunteer_from_row))
    }

    /// Create a new volunteer.
    pub async fn create_volunteer(
        &self,
        request: &CreateVolunteerRequest,
    ) -> Result<Volunteer, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let skills = dedup(&request.skills);
        let skills_json = skill_codes_json(&skills);
        let interests_json = request
            .interests
            .as_ref()
            .map(|i| serde_json::to_string(i).unwrap_or_default());
        let availability_json = request
            .availability
            .as_ref()
            .map(|a| serde_json::to_string(a).unwrap_or_default());

        sqlx::query(
            "INSERT INTO volunteers (id, name, email, skills, interests, availability, active, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&skills_json)
        .bind(&interests_json)
        .bind(&availability_json)
        .bind(request.active as i32)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Volunteer {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            skills,
            interests: request.interests.clone(),
            availability: request.availability.clone(),
            active: request.active,
            updated_at: now,
            version: 1,
        })
    }

    /// Update a volunteer with optimistic concurrency control.
    pub async fn update_volunteer(
        &self,
        id: &str,
        request: &UpdateVolunteerRequest,
    ) -> Result<Volunteer, AppError> {
        let existing = self
            .get_volunteer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Volunteer {} not found", id)))?;

        // Check version for optimistic concurrency
        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let email = request.email.clone().or(existing.email.clone());
        let skills = request
            .skills
            .as_ref()
            .map(|s| dedup(s))
            .unwrap_or(existing.skills.clone());
        let interests = request.interests.clone().or(existing.interests.clone());
        let availability = request
            .availability
            .clone()
            .or(existing.availability.clone());
        let active = request.active.unwrap_or(existing.active);

        let skills_json = skill_codes_json(&skills);
        let interests_json = interests
            .as_ref()
            .map(|i| serde_json::to_string(i).unwrap_or_default());
        let availability_json = availability
            .as_ref()
            .map(|a| serde_json::to_string(a).unwrap_or_default());

        // Use conditional UPDATE with version check to prevent race conditions
        let result = sqlx::query(
            "UPDATE volunteers SET name = ?, email = ?, skills = ?, interests = ?, availability = ?, active = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(name)
        .bind(&email)
        .bind(&skills_json)
        .bind(&interests_json)
        .bind(&availability_json)
        .bind(active as i32)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Race condition - version changed between read and write
            let current = self.get_volunteer(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|v| v.version).unwrap_or(0),
            });
        }

        self.increment_revision().await?;

        Ok(Volunteer {
            id: id.to_string(),
            name: name.clone(),
            email,
            skills,
            interests,
            availability,
            active,
            updated_at: now,
            version: new_version,
        })
    }

    /// Delete a volunteer along with their assignments and notifications.
    pub async fn delete_volunteer(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM volunteers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Volunteer {} not found", id)));
        }

        sqlx::query("DELETE FROM assignments WHERE volunteer_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM notifications WHERE volunteer_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;
        Ok(())
    }

    // ==================== EVENT OPERATIONS ====================

    /// List all events.
    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, description, location, required_skills, urgency, date, updated_at, version FROM events ORDER BY date"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(event_from_row).collect())
    }

    /// List events whose date is in the future, soonest first.
    ///
    /// Dates are filtered in Rust because RFC 3339 strings with mixed
    /// timezone suffixes do not order lexicographically.
    pub async fn list_upcoming_events(&self) -> Result<Vec<Event>, AppError> {
        let now = Utc::now();
        let mut dated: Vec<(DateTime<chrono::FixedOffset>, Event)> = self
            .list_events()
            .await?
            .into_iter()
            .filter_map(|e| {
                DateTime::parse_from_rfc3339(&e.date)
                    .ok()
                    .map(|date| (date, e))
            })
            .filter(|(date, _)| *date >= now)
            .collect();
        dated.sort_by_key(|(date, _)| *date);

        Ok(dated.into_iter().map(|(_, e)| e).collect())
    }

    /// Get an event by ID.
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, location, required_skills, urgency, date, updated_at, version FROM events WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(event_from_row))
    }

    /// Create a new event.
    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<Event, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let required_skills = dedup(&request.required_skills);
        let skills_json = skill_codes_json(&required_skills);

        sqlx::query(
            "INSERT INTO events (id, name, description, location, required_skills, urgency, date, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.location)
        .bind(&skills_json)
        .bind(request.urgency.as_str())
        .bind(&request.date)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Event {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            location: request.location.clone(),
            required_skills,
            urgency: request.urgency,
            date: request.date.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Update an event with optimistic concurrency control.
    pub async fn update_event(
        &self,
        id: &str,
        request: &UpdateEventRequest,
    ) -> Result<Event, AppError> {
        let existing = self
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

        // Check version for optimistic concurrency
        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let description = request
            .description
            .as_ref()
            .unwrap_or(&existing.description);
        let location = request.location.as_ref().unwrap_or(&existing.location);
        let required_skills = request
            .required_skills
            .as_ref()
            .map(|s| dedup(s))
            .unwrap_or(existing.required_skills.clone());
        let urgency = request.urgency.unwrap_or(existing.urgency);
        let date = request.date.as_ref().unwrap_or(&existing.date);
        let skills_json = skill_codes_json(&required_skills);

        let result = sqlx::query(
            "UPDATE events SET name = ?, description = ?, location = ?, required_skills = ?, urgency = ?, date = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(name)
        .bind(description)
        .bind(location)
        .bind(&skills_json)
        .bind(urgency.as_str())
        .bind(date)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_event(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|e| e.version).unwrap_or(0),
            });
        }

        self.increment_revision().await?;

        Ok(Event {
            id: id.to_string(),
            name: name.clone(),
            description: description.clone(),
            location: location.clone(),
            required_skills,
            urgency,
            date: date.clone(),
            updated_at: now,
            version: new_version,
        })
    }

    /// Delete an event along with its assignments.
    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }

        sqlx::query("DELETE FROM assignments WHERE event_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;
        Ok(())
    }

    // ==================== ASSIGNMENT OPERATIONS ====================

    /// Assign a volunteer to an event. Each (event, volunteer) pair may
    /// exist only once.
    pub async fn create_assignment(
        &self,
        event_id: &str,
        volunteer_id: &str,
        duration_minutes: i64,
    ) -> Result<Assignment, AppError> {
        let existing = sqlx::query("SELECT id FROM assignments WHERE event_id = ? AND volunteer_id = ?")
            .bind(event_id)
            .bind(volunteer_id)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::Duplicate(format!(
                "Volunteer {} is already assigned to event {}",
                volunteer_id, event_id
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO assignments (id, event_id, volunteer_id, date_utc, duration_minutes) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(event_id)
        .bind(volunteer_id)
        .bind(&now)
        .bind(duration_minutes)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Assignment {
            id,
            event_id: event_id.to_string(),
            volunteer_id: volunteer_id.to_string(),
            date_utc: now,
            duration_minutes,
        })
    }

    /// List the volunteer IDs assigned to an event.
    pub async fn list_event_assignments(&self, event_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query(
            "SELECT volunteer_id FROM assignments WHERE event_id = ? ORDER BY date_utc",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("volunteer_id")).collect())
    }

    /// List assignments joined with volunteer and event data, oldest first.
    pub async fn list_volunteer_activity(&self) -> Result<Vec<VolunteerActivityRow>, AppError> {
        let rows = sqlx::query(
            r#"SELECT v.name AS volunteer_name, v.email AS volunteer_email,
                      e.name AS event_name, e.date AS event_date,
                      a.duration_minutes, a.date_utc AS assigned_at
               FROM assignments a
               JOIN volunteers v ON v.id = a.volunteer_id
               JOIN events e ON e.id = a.event_id
               ORDER BY a.date_utc"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let email: Option<String> = row.get("volunteer_email");
                VolunteerActivityRow {
                    volunteer_name: row.get("volunteer_name"),
                    volunteer_email: email.unwrap_or_default(),
                    event_name: row.get("event_name"),
                    event_date: row.get("event_date"),
                    duration_minutes: row.get("duration_minutes"),
                    assigned_at: row.get("assigned_at"),
                }
            })
            .collect())
    }

    /// List events with aggregate assignment counts, oldest first.
    pub async fn list_event_participation(&self) -> Result<Vec<EventParticipationRow>, AppError> {
        let rows = sqlx::query(
            r#"SELECT e.name AS event_name, e.date AS event_date, e.location, e.urgency,
                      COUNT(a.id) AS volunteer_count,
                      COALESCE(SUM(a.duration_minutes), 0) AS total_minutes
               FROM events e
               LEFT JOIN assignments a ON a.event_id = e.id
               GROUP BY e.id
               ORDER BY e.date"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| EventParticipationRow {
                event_name: row.get("event_name"),
                event_date: row.get("event_date"),
                location: row.get("location"),
                urgency: row.get("urgency"),
                volunteer_count: row.get("volunteer_count"),
                total_minutes: row.get("total_minutes"),
            })
            .collect())
    }

    // ==================== NOTIFICATION OPERATIONS ====================

    /// Create a notification for a volunteer.
    pub async fn create_notification(
        &self,
        volunteer_id: &str,
        message: &str,
    ) -> Result<Notification, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO notifications (id, volunteer_id, message, read, created_at) VALUES (?, ?, ?, 0, ?)"
        )
        .bind(&id)
        .bind(volunteer_id)
        .bind(message)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Notification {
            id,
            volunteer_id: volunteer_id.to_string(),
            message: message.to_string(),
            read: false,
            created_at: now,
        })
    }

    /// List notifications, newest first, optionally for a single volunteer.
    pub async fn list_notifications(
        &self,
        volunteer_id: Option<&str>,
    ) -> Result<Vec<Notification>, AppError> {
        let rows = match volunteer_id {
            Some(vid) => {
                sqlx::query(
                    "SELECT id, volunteer_id, message, read, created_at FROM notifications WHERE volunteer_id = ? ORDER BY created_at DESC"
                )
                .bind(vid)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, volunteer_id, message, read, created_at FROM notifications ORDER BY created_at DESC"
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(notification_from_row).collect())
    }

    /// Mark every unread notification as read; returns the number updated.
    pub async fn mark_all_notifications_read(&self) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE read = 0")
            .execute(&self.pool)
            .await?;

        let updated = result.rows_affected();
        if updated > 0 {
            self.increment_revision().await?;
        }
        Ok(updated)
    }
}

// Helper functions for row conversion

fn volunteer_from_row(row: &sqlx::sqlite::SqliteRow) -> Volunteer {
    let active: i32 = row.get("active");
    let skills_str: String = row.get("skills");
    let interests_str: Option<String> = row.get("interests");
    let availability_str: Option<String> = row.get("availability");
    Volunteer {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        skills: skills_from_json(&skills_str),
        interests: interests_str.map(|s| parse_json_array(&s)),
        availability: availability_str.map(|s| parse_json_array(&s)),
        active: active != 0,
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn event_from_row(row: &sqlx::sqlite::SqliteRow) -> Event {
    let skills_str: String = row.get("required_skills");
    let urgency_str: String = row.get("urgency");
    Event {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        location: row.get("location"),
        required_skills: skills_from_json(&skills_str),
        urgency: EventUrgency::from_str(&urgency_str).unwrap_or_default(),
        date: row.get("date"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn notification_from_row(row: &sqlx::sqlite::SqliteRow) -> Notification {
    let read: i32 = row.get("read");
    Notification {
        id: row.get("id"),
        volunteer_id: row.get("volunteer_id"),
        message: row.get("message"),
        read: read != 0,
        created_at: row.get("created_at"),
    }
}

/// Serialize skills as a JSON array of stable integer codes.
fn skill_codes_json(skills: &[Skill]) -> String {
    let codes: Vec<i64> = skills.iter().map(|s| s.code()).collect();
    serde_json::to_string(&codes).unwrap_or_default()
}

/// Parse a JSON array of skill codes. Unknown codes cannot match anything
/// and are dropped.
fn skills_from_json(s: &str) -> Vec<Skill> {
    let codes: Vec<i64> = serde_json::from_str(s).unwrap_or_default();
    codes.into_iter().filter_map(Skill::from_code).collect()
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

/// Deduplicate skills, keeping first-occurrence order.
fn dedup(skills: &[Skill]) -> Vec<Skill> {
    let mut seen = std::collections::HashSet::new();
    skills
        .iter()
        .copied()
        .filter(|s| seen.insert(*s))
        .collect()
}
