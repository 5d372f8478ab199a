/*
 * Responsibility
 * - v1 URL structure
 * - execute-runbook authenticates inside the handler (the decision needs the body too)
 * - read-only job routes sit behind the bearer access middleware
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    jobs::{job_status, recent_jobs},
    runbooks::execute_runbook,
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let jobs = Router::new()
        .route("/job-status/{job_id}", get(job_status))
        .route("/recent-jobs", get(recent_jobs));
    let jobs = middleware::auth::access::apply(jobs, state);

    Router::new()
        .route("/execute-runbook", post(execute_runbook))
        .merge(jobs)
}
