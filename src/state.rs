/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to Clone: everything inside is an Arc or Copy
 */
use std::sync::Arc;
use std::time::Duration;

use crate::services::access::AccessService;
use crate::services::audit::AuditSink;
use crate::services::jobs::JobOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub access: Arc<AccessService>,
    pub orchestrator: Arc<dyn JobOrchestrator>,
    pub audit: Arc<dyn AuditSink>,
    pub job_submit_timeout: Duration,
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(
        access: Arc<AccessService>,
        orchestrator: Arc<dyn JobOrchestrator>,
        audit: Arc<dyn AuditSink>,
        job_submit_timeout: Duration,
        trust_proxy: bool,
    ) -> Self {
        Self {
            access,
            orchestrator,
            audit,
            job_submit_timeout,
            trust_proxy,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("access", &self.access)
            .field("job_submit_timeout", &self.job_submit_timeout)
            .field("trust_proxy", &self.trust_proxy)
            .finish_non_exhaustive()
    }
}
