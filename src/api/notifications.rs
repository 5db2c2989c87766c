//! Notification API endpoints.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::models::{MarkAllReadResponse, Notification};
use crate::AppState;

/// Query parameters for listing notifications.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub volunteer_id: Option<String>,
}

/// GET /api/notifications - List notifications, optionally for one volunteer.
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .repo
        .list_notifications(params.volunteer_id.as_deref())
        .await
    {
        Ok(notifications) => success(notifications, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/notifications/mark-all-read - Mark every notification read.
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
) -> ApiResult<MarkAllReadResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.mark_all_notifications_read().await {
        Ok(updated) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(MarkAllReadResponse { updated }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
