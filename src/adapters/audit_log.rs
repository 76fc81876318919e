//! Audit Sinks
//!
//! Destinations for the per-tick audit trail:
//! - `CsvAuditLog`: header plus one row per evaluation, flushed on demand
//! - `TracingAuditSink`: structured `debug!` events
//! - `NullAuditSink`: discards everything (audit disabled)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::{AuditRecord, AUDIT_HEADER};
use crate::ports::{AuditError, AuditSink};

/// CSV trade log
///
/// The file is truncated on open. Write errors are logged once and the
/// log goes quiet rather than failing the engine.
#[derive(Debug)]
pub struct CsvAuditLog {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: u64,
    failed: bool,
}

impl CsvAuditLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{}", AUDIT_HEADER)?;
        writer.flush()?;

        Ok(Self { path, writer, rows: 0, failed: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written since open, header excluded
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl AuditSink for CsvAuditLog {
    fn record(&mut self, record: &AuditRecord) {
        if self.failed {
            return;
        }
        match writeln!(self.writer, "{}", record.to_csv_row()) {
            Ok(()) => self.rows += 1,
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "audit log write failed, disabling");
                self.failed = true;
            }
        }
    }

    fn flush(&mut self) {
        if let Err(error) = self.writer.flush() {
            warn!(path = %self.path.display(), error = %error, "audit log flush failed");
        }
    }
}

/// Audit trail as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, record: &AuditRecord) {
        debug!(
            timestamp = record.timestamp,
            price_a = record.price_a,
            price_b = record.price_b,
            ratio = record.ratio,
            mu = record.mu,
            theta = record.theta,
            z = record.z_score,
            action = %record.action,
            "audit"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&mut self, _record: &AuditRecord) {}
}
