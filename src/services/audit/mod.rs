//! Audit trail for authentication and authorization decisions.
//!
//! Sinks are best-effort: a failed write is logged and swallowed by [`emit`],
//! it never changes the outcome of the decision being recorded.

mod memory;
mod tracing_sink;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryAuditSink;
pub use tracing_sink::TracingAuditSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AuthenticationSucceeded,
    AuthenticationRejected,
    AuthorizationDenied,
    JobAccepted,
    JobSubmitted,
    JobSubmissionFailed,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AuthenticationSucceeded => "authentication_succeeded",
            Self::AuthenticationRejected => "authentication_rejected",
            Self::AuthorizationDenied => "authorization_denied",
            Self::JobAccepted => "job_accepted",
            Self::JobSubmitted => "job_submitted",
            Self::JobSubmissionFailed => "job_submission_failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub action: AuditAction,
    /// Subject id (UPN) when a principal exists.
    pub principal: Option<String>,
    /// Caller network origin (forwarded client address or peer address).
    pub origin: Option<String>,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(action: AuditAction, timestamp: DateTime<Utc>) -> Self {
        Self {
            action,
            principal: None,
            origin: None,
            details: serde_json::Value::Null,
            timestamp,
        }
    }

    pub fn principal(mut self, subject_id: impl Into<String>) -> Self {
        self.principal = Some(subject_id.into());
        self
    }

    pub fn origin(mut self, origin: Option<&str>) -> Self {
        self.origin = origin.map(str::to_string);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

pub trait AuditSink: Send + Sync {
    /// Record `record`. Must not block on slow transports; buffer or drop instead.
    fn record(&self, record: AuditRecord) -> Result<(), AuditError>;
}

/// Fire-and-forget write.
pub fn emit(sink: &dyn AuditSink, record: AuditRecord) {
    let action = record.action;
    if let Err(err) = sink.record(record) {
        tracing::warn!(error = %err, %action, "failed to write audit record");
    }
}
