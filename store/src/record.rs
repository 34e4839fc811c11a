//! The persisted per-attempt record and its all-or-nothing writer.

use crate::StoreError;
use driveguard_types::{CheckName, CheckResult, Timestamp};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// File name of the record inside a session workspace.
pub const RECORD_FILE_NAME: &str = "session_result.json";

/// Everything that happened during one attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// When the attempt started (ISO-8601).
    #[serde(rename = "timestamp")]
    pub started_at: Timestamp,
    /// Executed checks in execution order.
    pub checks: Vec<CheckResult>,
    /// `None` when the attempt never reached a verdict.
    pub final_decision: Option<bool>,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, started_at: Timestamp) -> Self {
        Self {
            session_id: session_id.into(),
            started_at,
            checks: Vec::new(),
            final_decision: None,
        }
    }

    /// The recorded result for `name`, if that check ran.
    pub fn check(&self, name: CheckName) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Write the record to `path` atomically.
    ///
    /// The JSON goes to a temporary file in the same directory, is synced,
    /// and is then linked into place. An existing record at `path` is never
    /// overwritten.
    pub fn write_atomic(&self, path: &Path) -> Result<(), StoreError> {
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::io(path, "record path has no parent directory"))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, self)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tmp.write_all(b"\n").map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;

        tmp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                StoreError::AlreadyWritten(path.display().to_string())
            } else {
                StoreError::io(path, e.error)
            }
        })?;
        Ok(())
    }
}

/// Read a record back from disk.
pub fn read_record(path: &Path) -> Result<SessionRecord, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Corruption(e.to_string()))
}
