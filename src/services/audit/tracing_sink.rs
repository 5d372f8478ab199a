use super::{AuditError, AuditRecord, AuditSink};

/// Writes audit records as structured events on the `audit` tracing target.
///
/// Route them separately with e.g. `RUST_LOG=info,audit=info`.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            action = %record.action,
            principal = record.principal.as_deref().unwrap_or("-"),
            origin = record.origin.as_deref().unwrap_or("-"),
            timestamp = %record.timestamp.to_rfc3339(),
            details = %record.details,
            "audit"
        );
        Ok(())
    }
}
