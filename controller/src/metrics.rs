//! Prometheus metrics for the ignition controller.
//!
//! [`ControllerMetrics`] owns a dedicated [`Registry`]; the daemon can dump
//! it in the text exposition format after an attempt.

use driveguard_types::CheckName;
use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

/// Central collection of controller-level Prometheus metrics.
pub struct ControllerMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Attempts that allocated a session.
    pub attempts_started: IntCounter,
    /// Attempts that ended with ignition allowed.
    pub attempts_allowed: IntCounter,
    /// Attempts that reached a verdict and were blocked.
    pub attempts_blocked: IntCounter,
    /// Attempts aborted by a fatal error or interrupt.
    pub attempts_aborted: IntCounter,
    /// Failed or skipped checks, labelled by check name.
    pub check_failures: IntCounterVec,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time of a whole attempt, in seconds.
    pub attempt_duration_secs: Histogram,
}

impl ControllerMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let attempts_started = register_int_counter_with_registry!(
            Opts::new("driveguard_attempts_started_total", "Verification attempts started"),
            registry
        )
        .expect("failed to register attempts_started counter");

        let attempts_allowed = register_int_counter_with_registry!(
            Opts::new("driveguard_attempts_allowed_total", "Attempts that allowed ignition"),
            registry
        )
        .expect("failed to register attempts_allowed counter");

        let attempts_blocked = register_int_counter_with_registry!(
            Opts::new("driveguard_attempts_blocked_total", "Attempts whose verdict blocked ignition"),
            registry
        )
        .expect("failed to register attempts_blocked counter");

        let attempts_aborted = register_int_counter_with_registry!(
            Opts::new(
                "driveguard_attempts_aborted_total",
                "Attempts aborted by a fatal error or interrupt"
            ),
            registry
        )
        .expect("failed to register attempts_aborted counter");

        let check_failures = register_int_counter_vec_with_registry!(
            Opts::new("driveguard_check_failures_total", "Failed or skipped checks"),
            &["check"],
            registry
        )
        .expect("failed to register check_failures counter");

        // Warm-up alone is ~20 s, so buckets run 1 s → ~2 min.
        let attempt_duration_secs = register_histogram_with_registry!(
            HistogramOpts::new("driveguard_attempt_duration_secs", "Attempt wall time in seconds")
                .buckets(vec![1.0, 5.0, 10.0, 20.0, 30.0, 45.0, 60.0, 90.0, 120.0]),
            registry
        )
        .expect("failed to register attempt_duration_secs histogram");

        Self {
            registry,
            attempts_started,
            attempts_allowed,
            attempts_blocked,
            attempts_aborted,
            check_failures,
            attempt_duration_secs,
        }
    }

    pub fn record_failures(&self, failing: &[CheckName]) {
        for check in failing {
            self.check_failures.with_label_values(&[check.as_str()]).inc();
        }
    }

    /// Render every metric in the Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "metrics encoding failed");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Default for ControllerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_labelled_by_check() {
        let metrics = ControllerMetrics::new();
        metrics.record_failures(&[CheckName::Alcohol, CheckName::LicenseApi]);
        metrics.record_failures(&[CheckName::Alcohol]);
        assert_eq!(metrics.check_failures.with_label_values(&["alcohol"]).get(), 2);
        assert_eq!(metrics.check_failures.with_label_values(&["license_api"]).get(), 1);

        let text = metrics.encode();
        assert!(text.contains("driveguard_check_failures_total"));
    }
}
