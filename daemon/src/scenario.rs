//! Bench scenarios: a TOML description of what each simulated collaborator
//! should report, turned into a set of nullables.
//!
//! ```toml
//! alive = true
//! face_distance = 0.31      # omit for "no face detected"
//! document = "readable"     # or "unreadable"
//! expiry_date = "31/12/2030"
//! registry = "local"        # "accept", "reject", "unreachable"
//! gas_raw = 120
//! warmup_ms = 500           # defaults to the configured warm-up
//! camera_fault = false
//! ```

use anyhow::Context;
use driveguard_nullables::{
    NullCamera, NullExtractor, NullFaceMatcher, NullGasSensor, NullLicenseValidator,
    NullLivenessDetector,
};
use driveguard_types::license::{DOB, EXPIRY_DATE, LICENSE_NUMBER, NAME};
use driveguard_types::{Clock, CollaboratorError, FaceMatch, GateParams, LicenseFields};
use driveguard_verification::{Collaborators, LicenseValidator, LocalLicenseValidator};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Document {
    #[default]
    Readable,
    Unreadable,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    /// Offline check against the extracted expiry date.
    #[default]
    Local,
    Accept,
    Reject,
    Unreachable,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_true")]
    pub alive: bool,
    #[serde(default)]
    pub face_distance: Option<f64>,
    #[serde(default)]
    pub document: Document,
    #[serde(default = "default_expiry")]
    pub expiry_date: String,
    #[serde(default)]
    pub registry: Registry,
    #[serde(default)]
    pub gas_raw: u16,
    #[serde(default)]
    pub warmup_ms: Option<u64>,
    #[serde(default)]
    pub camera_fault: bool,
}

fn default_true() -> bool {
    true
}

fn default_expiry() -> String {
    "31/12/2030".to_string()
}

impl Scenario {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing scenario {}", path.display()))
    }

    fn license_fields(&self) -> LicenseFields {
        [
            (LICENSE_NUMBER, "SIM0000000001"),
            (NAME, "BENCH DRIVER"),
            (DOB, "01/01/1990"),
            (EXPIRY_DATE, self.expiry_date.as_str()),
        ]
        .into_iter()
        .collect()
    }

    /// Build the simulated collaborators, applying the configured thresholds.
    pub fn collaborators(&self, params: &GateParams, clock: Arc<dyn Clock>) -> Collaborators {
        let camera = if self.camera_fault {
            NullCamera::faulty("simulated camera fault")
        } else {
            NullCamera::new()
        };

        let face = match self.face_distance {
            Some(d) => FaceMatch::from_distance(d, params.face_match_threshold),
            None => FaceMatch::no_face(),
        };

        let extractor = match self.document {
            Document::Readable => NullExtractor::returning(self.license_fields()),
            Document::Unreadable => NullExtractor::unreadable(),
        };

        let validator: Arc<dyn LicenseValidator> = match self.registry {
            Registry::Local => Arc::new(LocalLicenseValidator::new(clock)),
            Registry::Accept => Arc::new(NullLicenseValidator::new(true)),
            Registry::Reject => Arc::new(NullLicenseValidator::new(false)),
            Registry::Unreachable => Arc::new(NullLicenseValidator::with_result(Err(
                CollaboratorError::ExternalServiceFailure("registry unreachable".into()),
            ))),
        };

        let warmup = self
            .warmup_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_secs(params.sensor_warmup_secs));

        Collaborators {
            camera: Arc::new(camera),
            liveness: Arc::new(NullLivenessDetector::new(self.alive)),
            extractor: Arc::new(extractor),
            matcher: Arc::new(NullFaceMatcher::with_result(Ok(face))),
            validator,
            gas_sensor: Arc::new(
                NullGasSensor::new(self.gas_raw)
                    .with_threshold(params.alcohol_threshold)
                    .with_warmup_delay(warmup),
            ),
        }
    }
}
