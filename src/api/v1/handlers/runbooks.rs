/*
 * Responsibility
 * - POST /execute-runbook
 * - credential + body → AccessService decision → orchestrator submission → 202
 * - Submission runs on its own task: a client disconnect or a timeout here
 *   does not cancel a job the orchestrator has started to accept
 */
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use chrono::Utc;
use serde_json::json;

use crate::api::v1::dto::runbooks::ExecuteRunbookResponse;
use crate::api::v1::extractors::ClientOrigin;
use crate::error::AppError;
use crate::services::audit::{self, AuditAction, AuditRecord};
use crate::services::authz::{OperationRequest, ValidatedJob};
use crate::services::jobs::JobId;
use crate::state::AppState;

pub async fn execute_runbook(
    State(state): State<AppState>,
    origin: ClientOrigin,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ExecuteRunbookResponse>), AppError> {
    let credential = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    // Body errors must not mask authentication failures, so a body that does
    // not parse is an empty request and fails later as an unknown operation.
    let request = parse_request(&body);

    let job = state
        .access
        .authorize_and_validate(credential, origin.as_deref(), &request, Utc::now())
        .into_result()?;

    let job_id = submit(&state, job.clone(), origin.0).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ExecuteRunbookResponse {
            success: true,
            job_id,
            operation: job.operation,
            what_if: job.what_if,
        }),
    ))
}

fn parse_request(body: &[u8]) -> OperationRequest {
    if body.is_empty() {
        return OperationRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "request body is not a valid operation request");
        OperationRequest::default()
    })
}

async fn submit(
    state: &AppState,
    job: ValidatedJob,
    origin: Option<String>,
) -> Result<JobId, AppError> {
    let orchestrator = state.orchestrator.clone();
    let audit_sink = state.audit.clone();

    let task = tokio::spawn(async move {
        let result = orchestrator.submit(&job).await;

        let record = match &result {
            Ok(job_id) => AuditRecord::new(AuditAction::JobSubmitted, Utc::now()).details(json!({
                "jobId": job_id,
                "operation": job.operation,
                "whatIf": job.what_if,
            })),
            Err(err) => {
                tracing::warn!(error = ?err, operation = %job.operation, "job submission failed");
                AuditRecord::new(AuditAction::JobSubmissionFailed, Utc::now()).details(json!({
                    "operation": job.operation,
                    "error": err.to_string(),
                }))
            }
        };
        audit::emit(
            audit_sink.as_ref(),
            record
                .principal(job.attribution.executed_by.as_str())
                .origin(origin.as_deref()),
        );

        result
    });

    match tokio::time::timeout(state.job_submit_timeout, task).await {
        Ok(Ok(result)) => result.map_err(AppError::from),
        Ok(Err(join_err)) => {
            tracing::error!(error = ?join_err, "job submission task panicked");
            Err(AppError::Internal)
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = state.job_submit_timeout.as_secs(),
                "job submission still running after timeout"
            );
            Err(AppError::SubmissionTimeout)
        }
    }
}
