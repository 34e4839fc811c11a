use driveguard_store::StoreError;
use driveguard_types::CollaboratorError;
use driveguard_verification::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("actuator hardware fault: {0}")]
    Hardware(CollaboratorError),

    #[error("actuator already released")]
    Released,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("attempt interrupted")]
    Interrupted,

    #[error("this controller has already run its attempt")]
    AttemptAlreadyRun,

    #[error("config error: {0}")]
    Config(String),
}

impl ControllerError {
    /// Whether the attempt ended because of a user interrupt rather than a
    /// fault.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}
