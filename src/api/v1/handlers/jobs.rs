/*
 * Responsibility
 * - GET /job-status/{job_id}, GET /recent-jobs
 * - Read-only: bearer authentication only, no role requirement
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::jobs::JobSnapshot;
use crate::state::AppState;

pub const RECENT_JOBS_LIMIT: usize = 10;

pub async fn job_status(
    State(state): State<AppState>,
    AuthCtx(principal): AuthCtx,
    Path(job_id): Path<String>,
) -> Result<Json<JobSnapshot>, AppError> {
    tracing::debug!(principal = principal.subject_id(), %job_id, "job status lookup");

    state
        .orchestrator
        .status(&job_id)
        .await
        .map_err(|err| {
            tracing::warn!(error = ?err, "job status lookup failed");
            AppError::from(err)
        })?
        .map(Json)
        .ok_or_else(|| AppError::not_found("job"))
}

pub async fn recent_jobs(
    State(state): State<AppState>,
    AuthCtx(_principal): AuthCtx,
) -> Result<Json<Vec<JobSnapshot>>, AppError> {
    let jobs = state
        .orchestrator
        .recent(RECENT_JOBS_LIMIT)
        .await
        .map_err(|err| {
            tracing::warn!(error = ?err, "recent jobs lookup failed");
            AppError::from(err)
        })?;
    Ok(Json(jobs))
}
