//! The verification pipeline driven directly, without the controller.

mod common;

use common::{license_fields, slow_sensor, NOW_SECS};
use driveguard_nullables::{
    NullCamera, NullClock, NullExtractor, NullFaceMatcher, NullGasSensor, NullLicenseValidator,
    NullLivenessDetector,
};
use driveguard_store::{Session, SessionContext};
use driveguard_types::{CheckName, CheckResult, CollaboratorError};
use driveguard_verification::{
    Collaborators, PipelineConfig, PipelineError, PipelineState, VerificationPipeline,
    WarmupScheduler,
};
use std::sync::Arc;

struct Rig {
    _dir: tempfile::TempDir,
    session: Session,
    liveness: Arc<NullLivenessDetector>,
    extractor: Arc<NullExtractor>,
    sensor: Arc<NullGasSensor>,
    pipeline: VerificationPipeline,
}

fn rig(liveness: NullLivenessDetector, extractor: NullExtractor, sensor: NullGasSensor) -> Rig {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionContext::new(dir.path())
        .create(&NullClock::new(NOW_SECS))
        .unwrap();
    let liveness = Arc::new(liveness);
    let extractor = Arc::new(extractor);
    let sensor = Arc::new(sensor);
    let collaborators = Collaborators {
        camera: Arc::new(NullCamera::new()),
        liveness: liveness.clone(),
        extractor: extractor.clone(),
        matcher: Arc::new(NullFaceMatcher::with_distance(0.41)),
        validator: Arc::new(NullLicenseValidator::new(true)),
        gas_sensor: sensor.clone(),
    };
    Rig {
        _dir: dir,
        session,
        liveness,
        extractor,
        sensor,
        pipeline: VerificationPipeline::new(collaborators, PipelineConfig::default()),
    }
}

#[tokio::test]
async fn completes_in_fixed_order_and_writes_artifacts() {
    let r = rig(
        NullLivenessDetector::new(true),
        NullExtractor::returning(license_fields("31/12/2030")),
        NullGasSensor::new(200),
    );
    let mut warmup = WarmupScheduler::start(r.sensor.clone(), true);
    let mut checks: Vec<CheckResult> = Vec::new();

    let report = r
        .pipeline
        .run(r.session.artifacts(), &mut warmup, &mut checks)
        .await
        .unwrap();

    assert_eq!(report.final_state, PipelineState::Completed);
    assert!(!report.aborted());
    assert!(report.outcome.passed());
    assert_eq!(
        checks.iter().map(|c| c.name).collect::<Vec<_>>(),
        CheckName::ALL.to_vec()
    );
    assert!(warmup.is_joined());
    assert_eq!(r.sensor.outstanding(), 0);

    let artifacts = r.session.artifacts();
    assert!(artifacts.face_image.exists());
    assert!(artifacts.document_image.exists());
    let raw = std::fs::read_to_string(&artifacts.raw_text).unwrap();
    assert!(raw.starts_with("DRIVING LICENSE"));
    assert!(raw.contains("ExpiryDate: 31/12/2030"));

    let ocr = checks.iter().find(|c| c.name == CheckName::Ocr).unwrap();
    let listed = ocr.details.as_ref().unwrap()["fields"].as_array().unwrap().len();
    assert_eq!(listed, 4);
}

#[tokio::test]
async fn liveness_abort_leaves_warmup_pending() {
    let r = rig(
        NullLivenessDetector::new(false),
        NullExtractor::returning(license_fields("31/12/2030")),
        slow_sensor(200, 300),
    );
    let mut warmup = WarmupScheduler::start(r.sensor.clone(), true);
    let mut checks: Vec<CheckResult> = Vec::new();

    let report = r
        .pipeline
        .run(r.session.artifacts(), &mut warmup, &mut checks)
        .await
        .unwrap();

    assert!(report.aborted());
    assert_eq!(checks.len(), 1);
    assert!(!warmup.is_joined());
    assert_eq!(r.extractor.calls(), 0);

    warmup.abandon().await;
    assert_eq!(r.sensor.initialized(), 1);
    assert_eq!(r.sensor.reads(), 0);
    assert_eq!(r.sensor.outstanding(), 0);
}

#[tokio::test]
async fn hardware_fault_is_recorded_then_returned() {
    let r = rig(
        NullLivenessDetector::with_result(Err(CollaboratorError::HardwareFault(
            "frame grab failed".into(),
        ))),
        NullExtractor::returning(license_fields("31/12/2030")),
        NullGasSensor::new(200),
    );
    let mut warmup = WarmupScheduler::start(r.sensor.clone(), false);
    let mut checks: Vec<CheckResult> = Vec::new();

    let err = r
        .pipeline
        .run(r.session.artifacts(), &mut warmup, &mut checks)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::HardwareFault { check: CheckName::Liveness, .. }
    ));
    assert_eq!(r.liveness.calls(), 1);
    assert_eq!(checks.len(), 1);
    assert!(!checks[0].status);
    assert_eq!(checks[0].details.as_ref().unwrap()["kind"], "fatal");

    warmup.abandon().await;
    assert_eq!(r.sensor.outstanding(), 0);
}

#[tokio::test]
async fn detection_failure_in_liveness_is_a_failing_check() {
    let r = rig(
        NullLivenessDetector::with_result(Err(CollaboratorError::DetectionFailure(
            "no eyes found".into(),
        ))),
        NullExtractor::returning(license_fields("31/12/2030")),
        NullGasSensor::new(200),
    );
    let mut warmup = WarmupScheduler::start(r.sensor.clone(), false);
    let mut checks: Vec<CheckResult> = Vec::new();

    let report = r
        .pipeline
        .run(r.session.artifacts(), &mut warmup, &mut checks)
        .await
        .unwrap();

    assert!(report.aborted());
    assert_eq!(checks[0].details.as_ref().unwrap()["kind"], "detection_failure");
    warmup.abandon().await;
}

#[tokio::test]
async fn sensor_read_failure_is_fatal() {
    let r = rig(
        NullLivenessDetector::new(true),
        NullExtractor::returning(license_fields("31/12/2030")),
        NullGasSensor::new(200).failing_read(CollaboratorError::HardwareFault("adc timeout".into())),
    );
    let mut warmup = WarmupScheduler::start(r.sensor.clone(), false);
    let mut checks: Vec<CheckResult> = Vec::new();

    let err = r
        .pipeline
        .run(r.session.artifacts(), &mut warmup, &mut checks)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::HardwareFault { check: CheckName::Alcohol, .. }
    ));
    assert_eq!(checks.len(), 5);
    // The sensor is released even though the read failed.
    assert_eq!(r.sensor.outstanding(), 0);
}
