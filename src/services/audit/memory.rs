use std::sync::Mutex;

use super::{AuditAction, AuditError, AuditRecord, AuditSink};

/// In-process audit buffer. Useful for tests and for inspecting recent activity.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn actions(&self) -> Vec<AuditAction> {
        self.records().into_iter().map(|r| r.action).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) -> Result<(), AuditError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AuditError::Unavailable("memory audit buffer poisoned".into()))?;
        records.push(record);
        Ok(())
    }
}
