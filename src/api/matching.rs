//! Matching API endpoints.
//!
//! Thin HTTP surface over the pure matcher in [`crate::matching`]: the data
//! comes from the repository, the computation does not.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::matching::{compute_match, MatchResult};
use crate::models::{Event, Volunteer};
use crate::AppState;

/// Query parameters for the best-match endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMatchQuery {
    pub volunteer_id: String,
}

/// GET /api/matching/volunteers - Volunteers eligible for matching.
pub async fn list_matching_volunteers(
    State(state): State<AppState>,
) -> ApiResult<Vec<Volunteer>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_active_volunteers().await {
        Ok(volunteers) => success(volunteers, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/matching/events - Candidate events for matching (upcoming only).
pub async fn list_matching_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_upcoming_events().await {
        Ok(events) => success(events, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/matching/best?volunteerId=... - Compute the best event match
/// for a volunteer over the upcoming events.
///
/// Recomputed from scratch on every call; nothing is cached.
pub async fn best_match(
    State(state): State<AppState>,
    Query(params): Query<BestMatchQuery>,
) -> ApiResult<MatchResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if params.volunteer_id.trim().is_empty() {
        return error(
            AppError::Validation("Volunteer ID is required".to_string()),
            revision_id,
        );
    }

    let volunteer = match state.repo.get_volunteer(&params.volunteer_id).await {
        Ok(Some(volunteer)) => volunteer,
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Volunteer {} not found", params.volunteer_id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    };

    let events = match state.repo.list_upcoming_events().await {
        Ok(events) => events,
        Err(e) => return error(e, revision_id),
    };

    match compute_match(&volunteer, &events) {
        Ok(result) => success(result, revision_id),
        Err(e) => error(e.into(), revision_id),
    }
}
