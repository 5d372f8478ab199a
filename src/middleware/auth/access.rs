//! Bearer credential → Principal in request extensions.
//!
//! Used for read-only routes that need an authenticated caller but no
//! operation-level role check. Handlers take the Principal via `AuthCtx`.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;

use crate::api::v1::extractors::client_origin::client_origin;
use crate::error::AppError;
use crate::state::AppState;

/// Require a valid bearer credential on every route of `router`.
///
/// ```ignore
/// let jobs = Router::new().route("/recent-jobs", get(recent_jobs));
/// let jobs = middleware::auth::access::apply(jobs, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 from_fn cannot take a State extractor, so pass the state explicitly
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let origin = client_origin(req.headers(), req.extensions(), state.trust_proxy);
    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let principal = state
        .access
        .authenticate(credential, origin.as_deref(), Utc::now())?;

    // middleware → extractor
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
