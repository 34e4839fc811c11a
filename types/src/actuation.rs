//! The binary actuation interface and its two states.

use crate::error::CollaboratorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ignition relay state. The safe value is [`ActuatorState::Blocked`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorState {
    #[default]
    Blocked,
    Allowed,
}

impl ActuatorState {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocked => f.write_str("blocked"),
            Self::Allowed => f.write_str("allowed"),
        }
    }
}

/// Hardware signal driving the ignition relay (e.g. a GPIO line).
///
/// Implementations are exclusively owned; nothing but the fail-safe
/// wrapper in the controller should call these directly.
pub trait Actuator: Send {
    /// Drive the signal to its safe (blocked) level.
    fn set_safe(&mut self) -> Result<(), CollaboratorError>;

    /// Drive the signal to its active (allowed) level.
    fn set_active(&mut self) -> Result<(), CollaboratorError>;

    /// Give the underlying resource back to the system.
    fn release(&mut self) -> Result<(), CollaboratorError>;
}
