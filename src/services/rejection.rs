//! Rejection taxonomy shared by the claims extractor and the gate.
//!
//! Every denied request is classified into exactly one of these kinds.
//! The payloads (`required`, `violations`) are safe to return to the caller.

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing or malformed bearer credential")]
    MissingCredential,

    #[error("malformed token")]
    MalformedToken,

    #[error("token expired")]
    Expired,

    #[error("token issued for a different tenant")]
    WrongTenant,

    #[error("insufficient role; one of {required:?} is required")]
    InsufficientRole { required: Vec<String> },

    #[error("invalid parameters ({} violation(s))", violations.len())]
    InvalidParameters { violations: Vec<Violation> },

    #[error("unknown operation: {operation}")]
    UnknownOperation { operation: String },
}

impl Rejection {
    /// Stable machine-readable reason, used in audit records and response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::Expired => "TOKEN_EXPIRED",
            Self::WrongTenant => "WRONG_TENANT",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::InvalidParameters { .. } => "INVALID_PARAMETERS",
            Self::UnknownOperation { .. } => "UNKNOWN_OPERATION",
        }
    }
}
