//! Interfaces to the external collaborators the pipeline drives.
//!
//! Every call is blocking and may take seconds (camera stabilization, sensor
//! warm-up, network round-trips); the pipeline runs them on the blocking
//! thread pool. Implementations report failures with the shared
//! [`CollaboratorError`] taxonomy.

use driveguard_types::{CollaboratorError, FaceMatch, LicenseFields, SensorReading};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Still camera. Exclusive device: the pipeline never calls it concurrently.
pub trait ImageCapture: Send + Sync {
    /// Capture a stabilized still into `target` and return its path.
    fn capture_stable(&self, target: &Path) -> Result<PathBuf, CollaboratorError>;
}

/// Optical text extraction and field parsing for an identity document.
pub trait DocumentExtractor: Send + Sync {
    /// Extract fields from `image`. The raw recognized text is persisted to
    /// `raw_text_out` as a side effect. `Ok(None)` means nothing usable was
    /// read.
    fn extract(
        &self,
        image: &Path,
        doc_label: &str,
        raw_text_out: &Path,
    ) -> Result<Option<LicenseFields>, CollaboratorError>;
}

/// Face-embedding comparison between two images.
pub trait FaceMatcher: Send + Sync {
    fn compare(&self, image_a: &Path, image_b: &Path) -> Result<FaceMatch, CollaboratorError>;
}

/// Blink-based liveness detection. Bounded-duration blocking call.
pub trait LivenessDetector: Send + Sync {
    fn check(&self) -> Result<bool, CollaboratorError>;
}

/// Opaque handle to an initialized gas sensor.
#[derive(Debug, PartialEq, Eq)]
pub struct SensorHandle(u64);

impl SensorHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Slow-initializing gas sensor.
pub trait GasSensor: Send + Sync {
    /// Open the device; with `warmup` set this blocks for the stabilization
    /// delay before returning.
    fn initialize(&self, warmup: bool) -> Result<SensorHandle, CollaboratorError>;

    fn read(&self, handle: &SensorHandle) -> Result<SensorReading, CollaboratorError>;

    fn release(&self, handle: SensorHandle);
}

/// License-validity authority.
pub trait LicenseValidator: Send + Sync {
    fn verify(&self, fields: &LicenseFields) -> Result<bool, CollaboratorError>;
}

/// Everything the pipeline needs, bundled for one controller.
#[derive(Clone)]
pub struct Collaborators {
    pub camera: Arc<dyn ImageCapture>,
    pub liveness: Arc<dyn LivenessDetector>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub matcher: Arc<dyn FaceMatcher>,
    pub validator: Arc<dyn LicenseValidator>,
    pub gas_sensor: Arc<dyn GasSensor>,
}
