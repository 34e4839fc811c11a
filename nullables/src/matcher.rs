//! Nullable face matcher: returns a scripted distance.

use driveguard_types::params::FACE_MATCH_THRESHOLD;
use driveguard_types::{CollaboratorError, FaceMatch};
use driveguard_verification::FaceMatcher;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct NullFaceMatcher {
    result: Result<FaceMatch, CollaboratorError>,
    calls: AtomicUsize,
}

impl NullFaceMatcher {
    /// Classify `distance` against the default threshold.
    pub fn with_distance(distance: f64) -> Self {
        Self::with_result(Ok(FaceMatch::from_distance(distance, FACE_MATCH_THRESHOLD)))
    }

    /// No face (or several) in one of the images.
    pub fn no_face() -> Self {
        Self::with_result(Ok(FaceMatch::no_face()))
    }

    pub fn with_result(result: Result<FaceMatch, CollaboratorError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FaceMatcher for NullFaceMatcher {
    fn compare(&self, _image_a: &Path, _image_b: &Path) -> Result<FaceMatch, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
