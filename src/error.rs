/*
 * Responsibility
 * - AppError: every failure a handler can return
 * - IntoResponse: HTTP status + `{ "error": { code, message, ... } }`
 * - Rejection → status mapping lives here, nowhere else
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::auth::VerifyError;
use crate::services::jobs::OrchestratorError;
use crate::services::rejection::{Rejection, Violation};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("job submission failed")]
    SubmissionFailed(#[source] OrchestratorError),

    #[error("job submission timed out")]
    SubmissionTimeout,

    #[error("not found: {resource}")]
    NotFound { resource: &'static str },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("token verifier setup failed: {0}")]
    Verifier(#[from] VerifyError),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Rejected(rejection) => match rejection {
                Rejection::MissingCredential | Rejection::MalformedToken | Rejection::Expired => {
                    StatusCode::UNAUTHORIZED
                }
                Rejection::WrongTenant | Rejection::InsufficientRole { .. } => {
                    StatusCode::FORBIDDEN
                }
                Rejection::InvalidParameters { .. } | Rejection::UnknownOperation { .. } => {
                    StatusCode::BAD_REQUEST
                }
            },
            AppError::SubmissionFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::SubmissionTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Verifier(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        let (code, message) = match self {
            AppError::Rejected(rejection) => (rejection.code(), rejection.to_string()),
            AppError::SubmissionFailed(_) => (
                "JOB_SUBMISSION_FAILED",
                "the job could not be submitted".to_string(),
            ),
            AppError::SubmissionTimeout => (
                "JOB_SUBMISSION_TIMEOUT",
                "job submission did not complete in time".to_string(),
            ),
            AppError::NotFound { resource } => ("NOT_FOUND", format!("{resource} not found.")),
            // startup-only errors; never leak their detail to a client
            AppError::Config(_) | AppError::Verifier(_) | AppError::Internal => (
                "INTERNAL_SERVER_ERROR",
                "internal server error".to_string(),
            ),
        };

        let (required, violations) = match self {
            AppError::Rejected(Rejection::InsufficientRole { required }) => {
                (Some(required.clone()), None)
            }
            AppError::Rejected(Rejection::InvalidParameters { violations }) => {
                (None, Some(violations.clone()))
            }
            _ => (None, None),
        };

        ErrorBody {
            code,
            message,
            required,
            violations,
        }
    }
}

impl From<OrchestratorError> for AppError {
    fn from(e: OrchestratorError) -> Self {
        AppError::SubmissionFailed(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ErrorResponse { error: self.body() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn render(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn rejection_statuses() {
        let cases = [
            (Rejection::MissingCredential, StatusCode::UNAUTHORIZED),
            (Rejection::MalformedToken, StatusCode::UNAUTHORIZED),
            (Rejection::Expired, StatusCode::UNAUTHORIZED),
            (Rejection::WrongTenant, StatusCode::FORBIDDEN),
            (
                Rejection::InsufficientRole { required: vec![] },
                StatusCode::FORBIDDEN,
            ),
            (
                Rejection::InvalidParameters { violations: vec![] },
                StatusCode::BAD_REQUEST,
            ),
            (
                Rejection::UnknownOperation {
                    operation: "x".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (rejection, status) in cases {
            assert_eq!(AppError::from(rejection).status(), status);
        }
    }

    #[test]
    fn transport_failures() {
        assert_eq!(
            AppError::from(OrchestratorError::Unavailable("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::SubmissionTimeout.status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(AppError::not_found("job").status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn insufficient_role_body_lists_required_roles() {
        let (status, body) = render(AppError::from(Rejection::InsufficientRole {
            required: vec!["Global Administrator".into()],
        }))
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_ROLE");
        assert_eq!(body["error"]["required"], json!(["Global Administrator"]));
        assert!(body["error"].get("violations").is_none());
    }

    #[tokio::test]
    async fn invalid_parameters_body_lists_violations() {
        let (_, body) = render(AppError::from(Rejection::InvalidParameters {
            violations: vec![Violation::new("maxDevices", "must be between 1 and 500")],
        }))
        .await;

        assert_eq!(body["error"]["code"], "INVALID_PARAMETERS");
        assert_eq!(body["error"]["violations"][0]["field"], "maxDevices");
    }

    #[tokio::test]
    async fn orchestrator_detail_is_not_exposed() {
        let (status, body) = render(AppError::from(OrchestratorError::Unavailable(
            "https://internal.example/secret".into(),
        )))
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "JOB_SUBMISSION_FAILED");
        assert!(!body.to_string().contains("internal.example"));
    }
}
