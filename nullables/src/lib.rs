//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the controller talks to (clock, camera, document
//! extractor, face matcher, blink detector, gas sensor, license registry,
//! ignition relay) sits behind a trait. This crate provides scriptable
//! implementations that:
//! - Return pre-configured values
//! - Record how they were called
//! - Never touch real hardware or the network
//!
//! Usage: swap real implementations for nullables in tests and bench runs.

pub mod actuator;
pub mod camera;
pub mod clock;
pub mod extractor;
pub mod license;
pub mod liveness;
pub mod matcher;
pub mod sensor;

pub use actuator::{ActuatorProbe, NullActuator, Signal};
pub use camera::NullCamera;
pub use clock::NullClock;
pub use extractor::NullExtractor;
pub use license::NullLicenseValidator;
pub use liveness::NullLivenessDetector;
pub use matcher::NullFaceMatcher;
pub use sensor::NullGasSensor;
