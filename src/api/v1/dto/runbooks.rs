/*
 * Responsibility
 * - Response body for POST /execute-runbook
 * - The request body is `services::authz::OperationRequest` (parsed leniently by the handler)
 */
use serde::Serialize;

use crate::services::authz::OperationTag;
use crate::services::jobs::JobId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRunbookResponse {
    pub success: bool,
    pub job_id: JobId,
    pub operation: OperationTag,
    pub what_if: bool,
}
