use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{JobId, JobOrchestrator, JobSnapshot, JobStatus, OrchestratorError};
use crate::services::authz::ValidatedJob;

pub const DEFAULT_JOB_RETENTION: usize = 1000;

/// Process-local orchestrator: records submissions and reports them as queued.
///
/// Stands in for the cloud automation account during development and tests.
/// Keeps at most `capacity` jobs; the oldest are evicted first.
#[derive(Debug, Clone)]
pub struct InMemoryOrchestrator {
    inner: Arc<RwLock<Retained>>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Retained {
    order: VecDeque<JobId>,
    jobs: HashMap<JobId, (JobSnapshot, ValidatedJob)>,
}

impl Default for InMemoryOrchestrator {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_JOB_RETENTION)
    }
}

impl InMemoryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `capacity` is clamped to at least one job.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Retained::default())),
            capacity: capacity.max(1),
        }
    }

    /// Full validated payload of a retained job.
    pub async fn submitted(&self, job_id: &str) -> Option<ValidatedJob> {
        self.inner
            .read()
            .await
            .jobs
            .get(&JobId(job_id.to_string()))
            .map(|(_, job)| job.clone())
    }
}

#[async_trait]
impl JobOrchestrator for InMemoryOrchestrator {
    async fn submit(&self, job: &ValidatedJob) -> Result<JobId, OrchestratorError> {
        let job_id = JobId(Uuid::new_v4().to_string());
        let snapshot = JobSnapshot {
            job_id: job_id.clone(),
            operation: job.operation,
            what_if: job.what_if,
            status: JobStatus::Queued,
            submitted_at: Utc::now(),
            executed_by: job.attribution.executed_by.clone(),
        };

        let mut inner = self.inner.write().await;
        while inner.order.len() >= self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.jobs.remove(&evicted);
            }
        }
        inner.order.push_back(job_id.clone());
        inner.jobs.insert(job_id.clone(), (snapshot, job.clone()));
        drop(inner);

        tracing::debug!(%job_id, operation = %job.operation, "job recorded");
        Ok(job_id)
    }

    async fn status(&self, job_id: &str) -> Result<Option<JobSnapshot>, OrchestratorError> {
        Ok(self
            .inner
            .read()
            .await
            .jobs
            .get(&JobId(job_id.to_string()))
            .map(|(snapshot, _)| snapshot.clone()))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<JobSnapshot>, OrchestratorError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.jobs.get(id))
            .take(limit)
            .map(|(snapshot, _)| snapshot.clone())
            .collect())
    }
}
