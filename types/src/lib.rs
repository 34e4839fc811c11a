//! Fundamental types shared across the DriveGuard workspace.
//!
//! Everything the pipeline, the audit log and the controller exchange lives
//! here: check names and results, the collaborator error taxonomy, the
//! actuation interface, thresholds, and the time abstraction.

pub mod actuation;
pub mod check;
pub mod error;
pub mod license;
pub mod measurement;
pub mod params;
pub mod time;

pub use actuation::{Actuator, ActuatorState};
pub use check::{CheckName, CheckRecorder, CheckResult};
pub use error::CollaboratorError;
pub use license::LicenseFields;
pub use measurement::{FaceMatch, SensorReading};
pub use params::GateParams;
pub use time::{Clock, SystemClock, Timestamp};
