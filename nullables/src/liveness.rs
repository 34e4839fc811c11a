//! Nullable liveness detector.

use driveguard_types::CollaboratorError;
use driveguard_verification::LivenessDetector;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct NullLivenessDetector {
    result: Result<bool, CollaboratorError>,
    calls: AtomicUsize,
}

impl NullLivenessDetector {
    pub fn new(alive: bool) -> Self {
        Self::with_result(Ok(alive))
    }

    pub fn with_result(result: Result<bool, CollaboratorError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LivenessDetector for NullLivenessDetector {
    fn check(&self) -> Result<bool, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
