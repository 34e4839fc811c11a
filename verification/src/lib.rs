//! Verification core for the ignition gate.
//!
//! Three pieces:
//! 1. **Warm-up**: the gas sensor is initialized on a background task as soon
//!    as an attempt starts, and joined only when its reading is needed.
//! 2. **Pipeline**: captures both images, then runs liveness, document
//!    extraction, identity match, remote validation and the sensor read in a
//!    fixed order driven by an explicit state machine.
//! 3. **Aggregation**: the per-check booleans are reduced to one verdict with
//!    AND-gate semantics over the full check set.
//!
//! Collaborators (camera, OCR, face matcher, blink detector, gas sensor,
//! license registry) are consumed through the traits in [`collaborators`].

pub mod collaborators;
pub mod error;
pub mod license;
pub mod outcomes;
pub mod pipeline;
pub mod state;
pub mod warmup;

pub use collaborators::{
    Collaborators, DocumentExtractor, FaceMatcher, GasSensor, ImageCapture, LicenseValidator,
    LivenessDetector, SensorHandle,
};
pub use error::{PipelineError, WarmupError};
pub use license::LocalLicenseValidator;
pub use outcomes::{DecisionAggregator, VerificationOutcome};
pub use pipeline::{PipelineConfig, PipelineReport, VerificationPipeline};
pub use state::{PipelineState, StepEvent};
pub use warmup::{ReadySensor, WarmupHandle, WarmupScheduler};
