//! Shared harness: a controller wired to nullable collaborators inside a
//! temporary data directory.

#![allow(dead_code)]

use driveguard_controller::{ControllerConfig, IgnitionController};
use driveguard_nullables::{
    ActuatorProbe, NullActuator, NullCamera, NullClock, NullExtractor, NullFaceMatcher,
    NullGasSensor, NullLicenseValidator, NullLivenessDetector,
};
use driveguard_types::license::{DOB, EXPIRY_DATE, LICENSE_NUMBER, NAME};
use driveguard_types::{Clock, LicenseFields};
use driveguard_verification::{Collaborators, LicenseValidator, LocalLicenseValidator};
use std::sync::Arc;
use std::time::Duration;

/// 2024-06-15 12:00:00 UTC.
pub const NOW_SECS: i64 = 1_718_452_800;

pub fn license_fields(expiry: &str) -> LicenseFields {
    [
        (LICENSE_NUMBER, "KA0120231234567"),
        (NAME, "ASHA RAO"),
        (DOB, "01/02/1990"),
        (EXPIRY_DATE, expiry),
    ]
    .into_iter()
    .collect()
}

/// How the license check should behave.
pub enum Validator {
    /// Real local validation against the harness clock.
    Local,
    /// Scripted answer.
    Null(NullLicenseValidator),
}

pub struct Scenario {
    pub camera: NullCamera,
    pub liveness: NullLivenessDetector,
    pub extractor: NullExtractor,
    pub matcher: NullFaceMatcher,
    pub validator: Validator,
    pub sensor: NullGasSensor,
    pub actuator: NullActuator,
    pub config: ControllerConfig,
}

impl Scenario {
    /// Every check passes: live, readable license expiring in the future,
    /// distance 0.3, registry accepts, sensor reads 300.
    pub fn passing() -> Self {
        Self {
            camera: NullCamera::new(),
            liveness: NullLivenessDetector::new(true),
            extractor: NullExtractor::returning(license_fields("31/12/2030")),
            matcher: NullFaceMatcher::with_distance(0.3),
            validator: Validator::Local,
            sensor: NullGasSensor::new(300),
            actuator: NullActuator::new(),
            config: ControllerConfig::default(),
        }
    }

    pub fn build(self) -> Harness {
        let dir = tempfile::tempdir().expect("temp dir");
        let clock = Arc::new(NullClock::new(NOW_SECS));

        let camera = Arc::new(self.camera);
        let liveness = Arc::new(self.liveness);
        let extractor = Arc::new(self.extractor);
        let matcher = Arc::new(self.matcher);
        let sensor = Arc::new(self.sensor);
        let (validator, null_validator): (Arc<dyn LicenseValidator>, _) = match self.validator {
            Validator::Local => (
                Arc::new(LocalLicenseValidator::new(clock.clone() as Arc<dyn Clock>))
                    as Arc<dyn LicenseValidator>,
                None,
            ),
            Validator::Null(v) => {
                let v = Arc::new(v);
                (v.clone() as Arc<dyn LicenseValidator>, Some(v))
            }
        };

        let collaborators = Collaborators {
            camera: camera.clone(),
            liveness: liveness.clone(),
            extractor: extractor.clone(),
            matcher: matcher.clone(),
            validator,
            gas_sensor: sensor.clone(),
        };

        let probe = self.actuator.probe();
        let config = ControllerConfig {
            data_dir: dir.path().join("sessions"),
            ..self.config
        };
        let controller = IgnitionController::new(
            config,
            collaborators,
            Box::new(self.actuator),
            clock.clone(),
        )
        .expect("controller");

        Harness {
            dir,
            clock,
            camera,
            liveness,
            extractor,
            matcher,
            null_validator,
            sensor,
            probe,
            controller,
        }
    }
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub clock: Arc<NullClock>,
    pub camera: Arc<NullCamera>,
    pub liveness: Arc<NullLivenessDetector>,
    pub extractor: Arc<NullExtractor>,
    pub matcher: Arc<NullFaceMatcher>,
    pub null_validator: Option<Arc<NullLicenseValidator>>,
    pub sensor: Arc<NullGasSensor>,
    pub probe: ActuatorProbe,
    pub controller: IgnitionController,
}

pub fn slow_sensor(raw: u16, warmup_ms: u64) -> NullGasSensor {
    NullGasSensor::new(raw).with_warmup_delay(Duration::from_millis(warmup_ms))
}
