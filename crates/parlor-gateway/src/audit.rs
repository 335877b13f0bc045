//! Append-only audit trail.
//!
//! Exactly one line per intercepted request, regardless of how the pipeline
//! decides. The sink is a trait so production appends to a file while tests
//! capture lines in memory.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Username recorded when no identity is attached to the request
pub const ANONYMOUS: &str = "Anonymous";

/// Render one audit line.
///
/// Format: `<timestamp> - User: <username|Anonymous> - Path: <path>` with a
/// microsecond-precision timestamp.
#[must_use]
pub fn format_line(at: DateTime<Utc>, username: Option<&str>, path: &str) -> String {
    format!(
        "{} - User: {} - Path: {}",
        at.format("%Y-%m-%d %H:%M:%S%.6f"),
        username.unwrap_or(ANONYMOUS),
        path,
    )
}

/// Audit sink errors
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Underlying I/O failure while appending
    #[error("audit i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for audit lines.
///
/// Appends must be atomic per line; concurrent requests may interleave lines
/// but never bytes within one line.
pub trait AuditSink: Send + Sync {
    /// Append one line to the trail.
    fn append(&self, line: &str) -> Result<(), AuditError>;
}

/// File-backed sink appending one line per request.
pub struct FileAuditSink {
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Open (or create) the audit file in append mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn append(&self, line: &str) -> Result<(), AuditError> {
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

/// In-memory sink for tests and local inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines appended so far, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, line: &str) -> Result<(), AuditError> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}
