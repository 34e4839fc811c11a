//! Append-only audit log for one attempt.

use crate::record::SessionRecord;
use crate::session::Session;
use crate::StoreError;
use driveguard_types::{CheckName, CheckRecorder, CheckResult, Clock};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Collects [`CheckResult`]s while an attempt runs and writes the
/// [`SessionRecord`] exactly once when it ends.
///
/// [`AuditLogger::finalize`] consumes the logger, so a second write cannot be
/// expressed. If the logger is dropped without being finalized (a panic
/// unwinding through the controller, say) it makes one best-effort write
/// with no decision so the attempt still leaves a trace.
pub struct AuditLogger {
    path: PathBuf,
    record: SessionRecord,
    clock: Arc<dyn Clock>,
    finalized: bool,
}

impl AuditLogger {
    pub fn new(session: &Session, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: session.record_path(),
            record: SessionRecord::new(session.id().as_str(), session.created_at()),
            clock,
            finalized: false,
        }
    }

    /// Checks recorded so far, in execution order.
    pub fn checks(&self) -> &[CheckResult] {
        &self.record.checks
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Set the decision and write the full record.
    ///
    /// Pass `None` when the attempt never reached a verdict (interrupted).
    /// Returns the record as written.
    pub fn finalize(mut self, decision: Option<bool>) -> Result<SessionRecord, StoreError> {
        self.finalized = true;
        self.record.final_decision = decision;
        self.record.write_atomic(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            checks = self.record.checks.len(),
            decision = ?decision,
            "session record written"
        );
        Ok(self.record.clone())
    }
}

impl CheckRecorder for AuditLogger {
    fn record(&mut self, name: CheckName, status: bool, details: Option<Value>) {
        debug_assert!(
            self.record.check(name).is_none(),
            "check {name} recorded twice"
        );
        self.record
            .checks
            .push(CheckResult::new(name, status, details, self.clock.now()));
    }
}

impl Drop for AuditLogger {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        self.record.final_decision = None;
        match self.record.write_atomic(&self.path) {
            Ok(()) => tracing::warn!(
                path = %self.path.display(),
                "audit logger dropped before finalize; partial record written"
            ),
            Err(e) => tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to write partial session record"
            ),
        }
    }
}
