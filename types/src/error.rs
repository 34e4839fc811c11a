//! Failure taxonomy for calls into external collaborators.

use thiserror::Error;

/// Everything a collaborator (camera, extractor, matcher, sensor, validator,
/// actuator) can report.
///
/// Only [`CollaboratorError::HardwareFault`] is fatal to an attempt. The other
/// variants are absorbed into a failing check and the pipeline carries on.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// Camera, sensor or actuator I/O failure.
    #[error("hardware fault: {0}")]
    HardwareFault(String),

    /// No face, multiple faces, or no text where some was expected.
    #[error("detection failure: {0}")]
    DetectionFailure(String),

    /// A field or date could not be parsed.
    #[error("format failure: {0}")]
    FormatFailure(String),

    /// Remote validation unreachable, timed out, or rejected the request.
    #[error("external service failure: {0}")]
    ExternalServiceFailure(String),
}

impl CollaboratorError {
    /// Whether the failure can be folded into a failing check.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::HardwareFault(_))
    }

    /// Short machine-readable label used in check details.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HardwareFault(_) => "hardware_fault",
            Self::DetectionFailure(_) => "detection_failure",
            Self::FormatFailure(_) => "format_failure",
            Self::ExternalServiceFailure(_) => "external_service_failure",
        }
    }
}
