//! Report export endpoints.
//!
//! Reports are generated on demand from the database and returned as CSV
//! downloads; nothing is stored server-side.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppErrorWithRevision};
use crate::AppState;

/// Query parameters shared by both report endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(default)]
    pub from_utc: Option<String>,
    #[serde(default)]
    pub to_utc: Option<String>,
}

/// GET /api/reports/volunteers - Volunteer activity report.
///
/// One row per assignment, filtered by assignment time.
pub async fn volunteer_report(
    State(state): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> Result<Response, AppErrorWithRevision> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let (from, to) = parse_range(&params).map_err(|e| with_revision(e, revision_id))?;

    let rows = state
        .repo
        .list_volunteer_activity()
        .await
        .map_err(|e| with_revision(e, revision_id))?;
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|r| within_range(&r.assigned_at, from.as_ref(), to.as_ref()))
        .collect();

    let body = to_csv(&rows).map_err(|e| with_revision(e, revision_id))?;
    let filename = format!("volunteer-activity-{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok(csv_response(&filename, body))
}

/// GET /api/reports/events - Event participation report.
///
/// One row per event with aggregate counts, filtered by event date.
pub async fn event_report(
    State(state): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> Result<Response, AppErrorWithRevision> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let (from, to) = parse_range(&params).map_err(|e| with_revision(e, revision_id))?;

    let rows = state
        .repo
        .list_event_participation()
        .await
        .map_err(|e| with_revision(e, revision_id))?;
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|r| within_range(&r.event_date, from.as_ref(), to.as_ref()))
        .collect();

    let body = to_csv(&rows).map_err(|e| with_revision(e, revision_id))?;
    let filename = format!("event-participation-{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok(csv_response(&filename, body))
}

type Range = (Option<DateTime<FixedOffset>>, Option<DateTime<FixedOffset>>);

/// Parse the optional fromUtc/toUtc bounds.
fn parse_range(params: &ReportQuery) -> Result<Range, AppError> {
    let from = params
        .from_utc
        .as_deref()
        .map(DateTime::parse_from_rfc3339)
        .transpose()
        .map_err(|_| AppError::Validation("fromUtc must be an RFC 3339 timestamp".to_string()))?;
    let to = params
        .to_utc
        .as_deref()
        .map(DateTime::parse_from_rfc3339)
        .transpose()
        .map_err(|_| AppError::Validation("toUtc must be an RFC 3339 timestamp".to_string()))?;
    Ok((from, to))
}

/// Whether `date` falls inside the inclusive range. Rows with unparsable
/// dates are excluded once any bound is set.
fn within_range(
    date: &str,
    from: Option<&DateTime<FixedOffset>>,
    to: Option<&DateTime<FixedOffset>>,
) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Ok(parsed) = DateTime::parse_from_rfc3339(date) else {
        return false;
    };
    if let Some(from) = from {
        if parsed < *from {
            return false;
        }
    }
    if let Some(to) = to {
        if parsed > *to {
            return false;
        }
    }
    true
}

/// Serialize rows to CSV bytes.
fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV error: {}", e)))
}

/// Build a CSV download response.
fn csv_response(filename: &str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn with_revision(error: AppError, revision_id: i64) -> AppErrorWithRevision {
    AppErrorWithRevision { error, revision_id }
}
