//! Job orchestrator boundary.
//!
//! The gate produces a `ValidatedJob`; something else runs it. The orchestrator
//! owns a submitted job's lifecycle: once `submit` has started, dropping the
//! caller does not cancel it.

mod in_memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::services::authz::{OperationTag, ValidatedJob};

pub use in_memory::{DEFAULT_JOB_RETENTION, InMemoryOrchestrator};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    /// Accepted by the orchestrator; execution is tracked on its side.
    Queued,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub operation: OperationTag,
    pub what_if: bool,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    pub executed_by: String,
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("orchestrator unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait JobOrchestrator: Send + Sync {
    async fn submit(&self, job: &ValidatedJob) -> Result<JobId, OrchestratorError>;

    async fn status(&self, job_id: &str) -> Result<Option<JobSnapshot>, OrchestratorError>;

    /// Most recent jobs first.
    async fn recent(&self, limit: usize) -> Result<Vec<JobSnapshot>, OrchestratorError>;
}
