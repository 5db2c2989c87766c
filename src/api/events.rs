//! Event API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::DateTime;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateEventRequest, Event, UpdateEventRequest};
use crate::AppState;

/// GET /api/events - List all events.
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_events().await {
        Ok(events) => success(events, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/events/upcoming - List future events, soonest first.
pub async fn list_upcoming_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_upcoming_events().await {
        Ok(events) => success(events, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/events/:id - Get a single event.
pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_event(&id).await {
        Ok(Some(event)) => success(event, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Event {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/events - Create a new event.
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Validate required fields
    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }
    if request.location.trim().is_empty() {
        return error(
            AppError::Validation("Location is required".to_string()),
            revision_id,
        );
    }
    if request.required_skills.is_empty() {
        return error(
            AppError::Validation("At least one required skill is required".to_string()),
            revision_id,
        );
    }
    if DateTime::parse_from_rfc3339(&request.date).is_err() {
        return error(
            AppError::Validation("Date must be an RFC 3339 timestamp".to_string()),
            revision_id,
        );
    }

    match state.repo.create_event(&request).await {
        Ok(event) => {
            // Index the new event
            if let Err(e) = state.search.index_event(&event).await {
                tracing::warn!("Failed to index event: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(event, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/events/:id - Update an event.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Some(date) = &request.date {
        if DateTime::parse_from_rfc3339(date).is_err() {
            return error(
                AppError::Validation("Date must be an RFC 3339 timestamp".to_string()),
                revision_id,
            );
        }
    }

    match state.repo.update_event(&id, &request).await {
        Ok(event) => {
            // Re-index the updated event
            if let Err(e) = state.search.index_event(&event).await {
                tracing::warn!("Failed to re-index event: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(event, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/events/:id - Delete an event.
pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_event(&id).await {
        Ok(()) => {
            // Remove from search index
            if let Err(e) = state.search.remove_event(&id).await {
                tracing::warn!("Failed to remove event from index: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
