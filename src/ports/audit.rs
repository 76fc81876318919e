use thiserror::Error;

use crate::domain::AuditRecord;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to open audit log: {0}")]
    IoError(#[from] std::io::Error),
}

/// Destination for audit records
///
/// Called once per evaluated tick, synchronously. Write failures are the
/// sink's problem; the engine never sees them.
pub trait AuditSink: Send {
    fn record(&mut self, record: &AuditRecord);

    fn flush(&mut self) {}
}

impl AuditSink for Box<dyn AuditSink> {
    fn record(&mut self, record: &AuditRecord) {
        (**self).record(record)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}
