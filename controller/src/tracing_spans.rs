//! Pre-built [`tracing::Span`] constructors for controller operations.
//!
//! Consistent span names and fields make an attempt's log lines easy to
//! filter and correlate, in both human and JSON output.

use tracing::{info_span, Span};

/// Span covering one verification attempt from session creation to
/// actuation.
pub fn attempt_span(session_id: &str) -> Span {
    info_span!("attempt", session = %session_id)
}

/// Span covering the fatal-error / interrupt teardown of an attempt.
pub fn fail_safe_span(reason: &str) -> Span {
    info_span!("fail_safe", reason = %reason)
}
