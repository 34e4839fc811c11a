//! The verification pipeline: runs every step of an attempt in order and
//! records each check as it completes.

use crate::collaborators::Collaborators;
use crate::error::PipelineError;
use crate::outcomes::VerificationOutcome;
use crate::state::{PipelineState, StepEvent};
use crate::warmup::WarmupHandle;
use driveguard_store::ArtifactPaths;
use driveguard_types::{CheckName, CheckRecorder, CollaboratorError, LicenseFields};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

const DEFAULT_DOCUMENT_LABEL: &str = "DRIVING LICENSE";
const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Pipeline tunables.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Label handed to the document extractor.
    pub document_label: String,
    /// Upper bound on the license validation call.
    pub validation_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            document_label: DEFAULT_DOCUMENT_LABEL.to_string(),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
        }
    }
}

/// What a completed (or liveness-aborted) run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    pub outcome: VerificationOutcome,
    pub final_state: PipelineState,
}

impl PipelineReport {
    pub fn aborted(&self) -> bool {
        self.final_state == PipelineState::Aborted
    }
}

/// Status plus details for one check, before it is recorded.
struct CheckOutput {
    ok: bool,
    details: Option<Value>,
}

impl CheckOutput {
    fn pass(details: Option<Value>) -> Self {
        Self { ok: true, details }
    }

    fn fail(details: Value) -> Self {
        Self {
            ok: false,
            details: Some(details),
        }
    }

    fn from_error(e: &CollaboratorError) -> Self {
        Self::fail(json!({ "kind": e.kind(), "reason": e.to_string() }))
    }
}

/// Run a blocking collaborator call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::TaskFailed(e.to_string()))
}

/// Split a collaborator result into fatal (hardware) and recoverable failures.
fn absorb<T>(
    check: CheckName,
    result: Result<T, CollaboratorError>,
) -> Result<Result<T, CollaboratorError>, PipelineError> {
    match result {
        Err(source) if !source.is_recoverable() => Err(PipelineError::HardwareFault { check, source }),
        other => Ok(other),
    }
}

/// Sequences captures and checks for one attempt.
pub struct VerificationPipeline {
    collaborators: Collaborators,
    config: PipelineConfig,
}

impl VerificationPipeline {
    pub fn new(collaborators: Collaborators, config: PipelineConfig) -> Self {
        Self {
            collaborators,
            config,
        }
    }

    /// Run the pipeline to `Completed` or `Aborted`.
    ///
    /// Every executed check goes to `recorder` as soon as it finishes, so a
    /// caller that drops this future (interrupt) or receives an error still
    /// holds the partial list. A check that hits a fatal error is recorded as
    /// failing before the error is returned. `warmup` is joined only in the
    /// sensor step; on an aborted run it is left pending for the caller.
    pub async fn run(
        &self,
        artifacts: &ArtifactPaths,
        warmup: &mut WarmupHandle,
        recorder: &mut (dyn CheckRecorder + Send),
    ) -> Result<PipelineReport, PipelineError> {
        let mut state = PipelineState::AwaitingCapture;
        let mut outcome = VerificationOutcome::new();
        let mut fields: Option<LicenseFields> = None;

        while !state.is_terminal() {
            let event = match state.check() {
                None => {
                    self.capture(artifacts).await?;
                    StepEvent::Captured
                }
                Some(check) => {
                    let span = tracing::info_span!("check", check = %check);
                    let output = match self
                        .run_check(check, artifacts, warmup, &mut fields)
                        .instrument(span)
                        .await
                    {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::error!(%check, error = %e, "fatal error during check");
                            recorder.record(
                                check,
                                false,
                                Some(json!({ "kind": "fatal", "reason": e.to_string() })),
                            );
                            return Err(e);
                        }
                    };

                    if output.ok {
                        tracing::info!(%check, "check passed");
                    } else {
                        tracing::warn!(%check, details = ?output.details, "check failed");
                    }
                    recorder.record(check, output.ok, output.details);
                    outcome.set(check, output.ok);
                    StepEvent::Checked(output.ok)
                }
            };

            state = state
                .next(event)
                .ok_or(PipelineError::InvalidTransition { from: state, event })?;
        }

        if state == PipelineState::Aborted {
            tracing::warn!("liveness failed; remaining checks skipped");
        }

        Ok(PipelineReport {
            outcome,
            final_state: state,
        })
    }

    async fn run_check(
        &self,
        check: CheckName,
        artifacts: &ArtifactPaths,
        warmup: &mut WarmupHandle,
        fields: &mut Option<LicenseFields>,
    ) -> Result<CheckOutput, PipelineError> {
        match check {
            CheckName::Liveness => self.check_liveness().await,
            CheckName::Ocr => {
                let (output, extracted) = self.extract_document(artifacts).await?;
                *fields = extracted;
                Ok(output)
            }
            CheckName::FaceMatch => self.match_faces(artifacts).await,
            CheckName::LicenseApi => self.validate_license(fields.as_ref()).await,
            CheckName::Alcohol => self.read_sensor(warmup).await,
        }
    }

    /// Face first, then the document. Any capture failure is fatal.
    async fn capture(&self, artifacts: &ArtifactPaths) -> Result<(), PipelineError> {
        for target in [&artifacts.face_image, &artifacts.document_image] {
            let camera = Arc::clone(&self.collaborators.camera);
            let target = target.clone();
            let path = blocking(move || camera.capture_stable(&target))
                .await?
                .map_err(PipelineError::Capture)?;
            tracing::info!(path = %path.display(), "image captured");
        }
        Ok(())
    }

    async fn check_liveness(&self) -> Result<CheckOutput, PipelineError> {
        let detector = Arc::clone(&self.collaborators.liveness);
        let result = blocking(move || detector.check()).await?;
        Ok(match absorb(CheckName::Liveness, result)? {
            Ok(true) => CheckOutput::pass(None),
            Ok(false) => CheckOutput::fail(json!({ "reason": "no blink detected" })),
            Err(e) => CheckOutput::from_error(&e),
        })
    }

    async fn extract_document(
        &self,
        artifacts: &ArtifactPaths,
    ) -> Result<(CheckOutput, Option<LicenseFields>), PipelineError> {
        let extractor = Arc::clone(&self.collaborators.extractor);
        let image = artifacts.document_image.clone();
        let raw_text = artifacts.raw_text.clone();
        let label = self.config.document_label.clone();
        let result = blocking(move || extractor.extract(&image, &label, &raw_text)).await?;

        Ok(match absorb(CheckName::Ocr, result)? {
            Ok(Some(fields)) if !fields.is_empty() => {
                (CheckOutput::pass(Some(json!({ "fields": fields.names() }))), Some(fields))
            }
            Ok(_) => (
                CheckOutput::fail(json!({ "kind": "detection_failure", "reason": "no fields extracted" })),
                None,
            ),
            Err(e) => (CheckOutput::from_error(&e), None),
        })
    }

    async fn match_faces(&self, artifacts: &ArtifactPaths) -> Result<CheckOutput, PipelineError> {
        let matcher = Arc::clone(&self.collaborators.matcher);
        let document = artifacts.document_image.clone();
        let face = artifacts.face_image.clone();
        let result = blocking(move || matcher.compare(&document, &face)).await?;

        Ok(match absorb(CheckName::FaceMatch, result)? {
            Ok(m) if m.distance.is_none() => CheckOutput::fail(
                json!({ "distance": null, "reason": "face detection failed" }),
            ),
            Ok(m) => CheckOutput {
                ok: m.matched,
                details: Some(json!({ "distance": m.distance })),
            },
            Err(e) => CheckOutput::from_error(&e),
        })
    }

    /// Runs only when extraction produced fields; the state machine routes
    /// around it otherwise.
    async fn validate_license(
        &self,
        fields: Option<&LicenseFields>,
    ) -> Result<CheckOutput, PipelineError> {
        let Some(fields) = fields.cloned() else {
            return Ok(CheckOutput::fail(json!({ "reason": "no extracted fields" })));
        };
        let validator = Arc::clone(&self.collaborators.validator);
        let timeout = self.config.validation_timeout;

        let result = match tokio::time::timeout(timeout, blocking(move || validator.verify(&fields))).await {
            Ok(joined) => joined?,
            Err(_) => Err(CollaboratorError::ExternalServiceFailure(format!(
                "no response within {}ms",
                timeout.as_millis()
            ))),
        };

        Ok(match absorb(CheckName::LicenseApi, result)? {
            Ok(true) => CheckOutput::pass(None),
            Ok(false) => CheckOutput::fail(json!({ "reason": "license rejected" })),
            Err(e) => CheckOutput::from_error(&e),
        })
    }

    /// Joins the warm-up, takes one reading, releases the sensor.
    async fn read_sensor(&self, warmup: &mut WarmupHandle) -> Result<CheckOutput, PipelineError> {
        let sensor = warmup.join().await?;
        let reading = sensor.read();
        sensor.release();

        Ok(match absorb(CheckName::Alcohol, reading)? {
            Ok(r) => CheckOutput {
                ok: !r.detected,
                details: Some(json!({ "raw_value": r.raw_value, "detected": r.detected })),
            },
            Err(e) => CheckOutput::from_error(&e),
        })
    }
}
