//! Nullable license validator: a fixed answer, optionally slow.

use driveguard_types::{CollaboratorError, LicenseFields};
use driveguard_verification::LicenseValidator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct NullLicenseValidator {
    result: Result<bool, CollaboratorError>,
    latency: Duration,
    calls: AtomicUsize,
}

impl NullLicenseValidator {
    pub fn new(valid: bool) -> Self {
        Self::with_result(Ok(valid))
    }

    pub fn with_result(result: Result<bool, CollaboratorError>) -> Self {
        Self {
            result,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Block this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LicenseValidator for NullLicenseValidator {
    fn verify(&self, _fields: &LicenseFields) -> Result<bool, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        self.result.clone()
    }
}
