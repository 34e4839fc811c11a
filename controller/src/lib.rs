//! DriveGuard ignition controller.
//!
//! The controller owns the ignition relay for the lifetime of the process
//! and runs one verification attempt:
//! - Allocates the session workspace
//! - Starts the gas-sensor warm-up in the background
//! - Runs the verification pipeline, recording every check
//! - Reduces the outcome to a verdict and writes the audit record
//! - Drives the relay, falling back to blocked on any error or interrupt

pub mod actuator;
pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod shutdown;
pub mod tracing_spans;

pub use actuator::FailSafeActuator;
pub use config::ControllerConfig;
pub use controller::{AttemptReport, IgnitionController};
pub use error::{ActuatorError, ControllerError};
pub use metrics::ControllerMetrics;
pub use shutdown::{Interrupt, ShutdownController};
