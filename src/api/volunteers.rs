//! Volunteer API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateVolunteerRequest, UpdateVolunteerRequest, Volunteer};
use crate::AppState;

/// GET /api/volunteers - List all volunteers.
pub async fn list_volunteers(State(state): State<AppState>) -> ApiResult<Vec<Volunteer>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_volunteers().await {
        Ok(volunteers) => success(volunteers, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/volunteers/:id - Get a single volunteer.
pub async fn get_volunteer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Volunteer> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_volunteer(&id).await {
        Ok(Some(volunteer)) => success(volunteer, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Volunteer {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/volunteers - Create a new volunteer.
pub async fn create_volunteer(
    State(state): State<AppState>,
    Json(request): Json<CreateVolunteerRequest>,
) -> ApiResult<Volunteer> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Validate required fields
    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_volunteer(&request).await {
        Ok(volunteer) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(volunteer, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/volunteers/:id - Update a volunteer.
pub async fn update_volunteer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateVolunteerRequest>,
) -> ApiResult<Volunteer> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_volunteer(&id, &request).await {
        Ok(volunteer) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(volunteer, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/volunteers/:id - Delete a volunteer.
pub async fn delete_volunteer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_volunteer(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
