//! Assignment API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{AssignVolunteerRequest, AssignVolunteerResponse, DEFAULT_DURATION_MINUTES};
use crate::AppState;

/// POST /api/events/:id/assign-volunteer - Assign a volunteer to an event.
///
/// The write the matching screen performs once an admin accepts a suggested
/// match. Creates a notification for the volunteer on success.
pub async fn assign_volunteer(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<AssignVolunteerRequest>,
) -> ApiResult<AssignVolunteerResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.volunteer_id.trim().is_empty() {
        return error(
            AppError::Validation("Volunteer ID is required".to_string()),
            revision_id,
        );
    }
    let duration = request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    if duration <= 0 {
        return error(
            AppError::Validation("Duration must be positive".to_string()),
            revision_id,
        );
    }

    // Both ends of the assignment must exist
    let event = match state.repo.get_event(&event_id).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Event {} not found", event_id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    };
    let volunteer = match state.repo.get_volunteer(&request.volunteer_id).await {
        Ok(Some(volunteer)) => volunteer,
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Volunteer {} not found", request.volunteer_id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    };

    match state
        .repo
        .create_assignment(&event.id, &volunteer.id, duration)
        .await
    {
        Ok(assignment) => {
            let message = format!("You have been assigned to {}", event.name);
            if let Err(e) = state.repo.create_notification(&volunteer.id, &message).await {
                tracing::warn!("Failed to create assignment notification: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(assignment.into(), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/events/:id/assignments - List volunteer IDs assigned to an event.
pub async fn list_event_assignments(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<Vec<String>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_event(&event_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Event {} not found", event_id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    }

    match state.repo.list_event_assignments(&event_id).await {
        Ok(volunteer_ids) => success(volunteer_ids, revision_id),
        Err(e) => error(e, revision_id),
    }
}
