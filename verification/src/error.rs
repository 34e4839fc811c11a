use crate::state::{PipelineState, StepEvent};
use driveguard_types::{CheckName, CollaboratorError};
use thiserror::Error;

/// Sensor warm-up failures.
#[derive(Debug, Error)]
pub enum WarmupError {
    #[error("sensor initialization failed: {0}")]
    Initialization(CollaboratorError),

    #[error("warm-up handle already joined")]
    AlreadyJoined,

    #[error("warm-up task failed: {0}")]
    TaskFailed(String),
}

/// Failures that abort the pipeline. Recoverable collaborator failures
/// never show up here; they become failing checks instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image capture failed: {0}")]
    Capture(CollaboratorError),

    #[error("hardware fault during {check}: {source}")]
    HardwareFault {
        check: CheckName,
        source: CollaboratorError,
    },

    #[error("sensor warm-up: {0}")]
    Warmup(#[from] WarmupError),

    #[error("invalid pipeline transition: {event:?} in state {from:?}")]
    InvalidTransition {
        from: PipelineState,
        event: StepEvent,
    },

    #[error("collaborator task failed: {0}")]
    TaskFailed(String),
}
