//! The ignition controller: one attempt from session creation to relay.

use crate::actuator::FailSafeActuator;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::ControllerMetrics;
use crate::shutdown::{interrupted, Interrupt};
use crate::tracing_spans::{attempt_span, fail_safe_span};
use driveguard_store::{AuditLogger, Session, SessionContext, SessionId, SessionRecord};
use driveguard_types::{Actuator, ActuatorState, CheckName, Clock};
use driveguard_utils::format_duration;
use driveguard_verification::{
    Collaborators, DecisionAggregator, GasSensor, PipelineState, VerificationPipeline,
    WarmupHandle, WarmupScheduler,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::Instrument;

/// Result of an attempt that reached a verdict.
#[derive(Clone, Debug)]
pub struct AttemptReport {
    pub session_id: SessionId,
    pub record_path: PathBuf,
    pub verdict: bool,
    /// Relay state right after actuation.
    pub actuator_state: ActuatorState,
    pub pipeline_state: PipelineState,
    /// Checks that failed or never ran.
    pub failing: Vec<CheckName>,
    /// The record as written to disk.
    pub record: SessionRecord,
    pub elapsed: Duration,
}

/// Owns the ignition relay and runs a single verification attempt.
///
/// The relay is driven safe when the controller is built and released when
/// it is shut down or dropped. A passing attempt leaves ignition allowed
/// until then; every other ending (failing verdict, fatal error, interrupt)
/// leaves it blocked, and the fatal endings release it immediately.
pub struct IgnitionController {
    config: ControllerConfig,
    sessions: SessionContext,
    pipeline: VerificationPipeline,
    gas_sensor: Arc<dyn GasSensor>,
    aggregator: DecisionAggregator,
    actuator: FailSafeActuator,
    clock: Arc<dyn Clock>,
    metrics: ControllerMetrics,
    attempted: bool,
}

impl IgnitionController {
    /// Take the relay (driving it safe first) and wire up the pipeline.
    pub fn new(
        config: ControllerConfig,
        collaborators: Collaborators,
        relay: Box<dyn Actuator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ControllerError> {
        let actuator = FailSafeActuator::new(relay)?;
        let sessions = SessionContext::new(&config.data_dir);
        let gas_sensor = Arc::clone(&collaborators.gas_sensor);
        let pipeline = VerificationPipeline::new(collaborators, config.pipeline_config());

        Ok(Self {
            config,
            sessions,
            pipeline,
            gas_sensor,
            aggregator: DecisionAggregator,
            actuator,
            clock,
            metrics: ControllerMetrics::new(),
            attempted: false,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn actuator_state(&self) -> ActuatorState {
        self.actuator.state()
    }

    pub fn metrics(&self) -> &ControllerMetrics {
        &self.metrics
    }

    /// Run the controller's one attempt.
    ///
    /// An interrupt broadcast on `shutdown` while the pipeline runs ends the
    /// attempt with [`ControllerError::Interrupted`] and no verdict.
    pub async fn run_attempt(
        &mut self,
        shutdown: &mut broadcast::Receiver<Interrupt>,
    ) -> Result<AttemptReport, ControllerError> {
        if self.attempted {
            return Err(ControllerError::AttemptAlreadyRun);
        }
        self.attempted = true;
        self.metrics.attempts_started.inc();
        let started = Instant::now();

        let session = match self.sessions.create(self.clock.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "could not create session workspace");
                self.fail_safe("storage", None).await;
                return Err(e.into());
            }
        };

        let span = attempt_span(session.id().as_str());
        let result = self
            .run_session(&session, shutdown, started)
            .instrument(span)
            .await;
        self.metrics
            .attempt_duration_secs
            .observe(started.elapsed().as_secs_f64());
        result
    }

    /// Release the relay (blocked). Consumes the controller.
    pub fn shutdown(mut self) -> Result<(), ControllerError> {
        self.actuator.cleanup()?;
        Ok(())
    }

    async fn run_session(
        &mut self,
        session: &Session,
        shutdown: &mut broadcast::Receiver<Interrupt>,
        started: Instant,
    ) -> Result<AttemptReport, ControllerError> {
        tracing::info!(workspace = %session.workspace().display(), "session created");

        let mut warmup = WarmupScheduler::start(Arc::clone(&self.gas_sensor), self.config.sensor_warmup);
        let mut audit = AuditLogger::new(session, Arc::clone(&self.clock));

        let result = tokio::select! {
            biased;
            cause = interrupted(shutdown) => {
                tracing::warn!(%cause, "attempt interrupted");
                Err(ControllerError::Interrupted)
            }
            r = self.pipeline.run(session.artifacts(), &mut warmup, &mut audit) => {
                r.map_err(ControllerError::from)
            }
        };

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                let decision = if e.is_interrupt() { None } else { Some(false) };
                self.fail_safe(&e.to_string(), Some(warmup)).await;
                if let Err(store_err) = audit.finalize(decision) {
                    tracing::error!(error = %store_err, "could not write session record after abort");
                }
                return Err(e);
            }
        };

        // Only pending after a liveness abort.
        warmup.abandon().await;

        let verdict = self.aggregator.reduce(&report.outcome);
        let failing = self.aggregator.failing(&report.outcome);
        self.metrics.record_failures(&failing);

        let actuation = if verdict {
            self.actuator.allow()
        } else {
            self.actuator.block()
        };

        // The written decision is what the relay ended up doing.
        let decision = verdict && actuation.is_ok();
        let written = audit.finalize(Some(decision));

        if let Err(e) = actuation {
            self.fail_safe("actuation failed", None).await;
            if let Err(store_err) = written {
                tracing::error!(error = %store_err, "could not write session record after relay fault");
            }
            return Err(e.into());
        }

        let record = match written {
            Ok(record) => record,
            Err(e) => {
                self.fail_safe("record write failed", None).await;
                return Err(e.into());
            }
        };

        if verdict {
            self.metrics.attempts_allowed.inc();
        } else {
            self.metrics.attempts_blocked.inc();
        }

        let elapsed = started.elapsed();
        tracing::info!(
            verdict,
            failing = ?failing,
            elapsed = %format_duration(elapsed),
            "attempt complete"
        );

        Ok(AttemptReport {
            session_id: session.id().clone(),
            record_path: session.record_path(),
            verdict,
            actuator_state: self.actuator.state(),
            pipeline_state: report.final_state,
            failing,
            record,
            elapsed,
        })
    }

    /// Block, settle the warm-up, release the relay.
    ///
    /// The sensor is released before the relay so no handle outlives the
    /// attempt.
    async fn fail_safe(&mut self, reason: &str, warmup: Option<WarmupHandle>) {
        async {
            tracing::error!("attempt aborted; forcing ignition blocked");
            self.metrics.attempts_aborted.inc();
            if let Err(e) = self.actuator.block() {
                tracing::error!(error = %e, "block failed");
            }
            if let Some(warmup) = warmup {
                warmup.abandon().await;
            }
            if let Err(e) = self.actuator.cleanup() {
                tracing::error!(error = %e, "relay cleanup failed");
            }
        }
        .instrument(fail_safe_span(reason))
        .await
    }
}
