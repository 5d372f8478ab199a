use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Principal;
use crate::services::rejection::Rejection;
use crate::state::AppState;

/// Principal placed in request extensions by the access middleware.
///
/// A route without the middleware has no Principal, which is reported as a
/// missing credential rather than silently allowed.
#[derive(Debug, Clone)]
pub struct AuthCtx(pub Principal);

impl FromRequestParts<AppState> for AuthCtx
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthCtx)
            .ok_or(AppError::Rejected(Rejection::MissingCredential))
    }
}
