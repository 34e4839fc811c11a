//! Pipeline state machine.
//!
//! The ordering and short-circuit policy lives in one table,
//! [`PipelineState::next`]:
//!
//! | state                                         | event            | next                        |
//! |-----------------------------------------------|------------------|-----------------------------|
//! | `AwaitingCapture`                             | `Captured`       | `AwaitingLiveness`          |
//! | `AwaitingLiveness`                            | `Checked(true)`  | `AwaitingExtraction`        |
//! | `AwaitingLiveness`                            | `Checked(false)` | `Aborted`                   |
//! | `AwaitingExtraction`                          | `Checked(ok)`    | `AwaitingIdentityMatch{ok}` |
//! | `AwaitingIdentityMatch{fields_available: true}`  | `Checked(_)`  | `AwaitingRemoteValidation`  |
//! | `AwaitingIdentityMatch{fields_available: false}` | `Checked(_)`  | `AwaitingSensor`            |
//! | `AwaitingRemoteValidation`                    | `Checked(_)`     | `AwaitingSensor`            |
//! | `AwaitingSensor`                              | `Checked(_)`     | `Completed`                 |
//!
//! Liveness is the only hard gate. Extraction failure skips remote
//! validation (which needs the extracted fields) but nothing else.

use driveguard_types::CheckName;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    AwaitingCapture,
    AwaitingLiveness,
    AwaitingExtraction,
    AwaitingIdentityMatch { fields_available: bool },
    AwaitingRemoteValidation,
    AwaitingSensor,
    /// Liveness failed; nothing else runs.
    Aborted,
    Completed,
}

/// What the step executed in the current state reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepEvent {
    /// Both images are on disk.
    Captured,
    /// The state's check ran with this status.
    Checked(bool),
}

impl PipelineState {
    /// Apply `event`, or `None` if the pair is not in the table.
    pub fn next(self, event: StepEvent) -> Option<PipelineState> {
        use PipelineState::*;
        use StepEvent::*;

        let next = match (self, event) {
            (AwaitingCapture, Captured) => AwaitingLiveness,
            (AwaitingLiveness, Checked(true)) => AwaitingExtraction,
            (AwaitingLiveness, Checked(false)) => Aborted,
            (AwaitingExtraction, Checked(ok)) => AwaitingIdentityMatch {
                fields_available: ok,
            },
            (
                AwaitingIdentityMatch {
                    fields_available: true,
                },
                Checked(_),
            ) => AwaitingRemoteValidation,
            (
                AwaitingIdentityMatch {
                    fields_available: false,
                },
                Checked(_),
            ) => AwaitingSensor,
            (AwaitingRemoteValidation, Checked(_)) => AwaitingSensor,
            (AwaitingSensor, Checked(_)) => Completed,
            _ => return None,
        };
        Some(next)
    }

    /// The check performed while in this state, if any.
    pub fn check(&self) -> Option<CheckName> {
        match self {
            Self::AwaitingLiveness => Some(CheckName::Liveness),
            Self::AwaitingExtraction => Some(CheckName::Ocr),
            Self::AwaitingIdentityMatch { .. } => Some(CheckName::FaceMatch),
            Self::AwaitingRemoteValidation => Some(CheckName::LicenseApi),
            Self::AwaitingSensor => Some(CheckName::Alcohol),
            Self::AwaitingCapture | Self::Aborted | Self::Completed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aborted | Self::Completed)
    }
}
