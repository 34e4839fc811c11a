//! Background sensor warm-up.
//!
//! The gas sensor needs a multi-second stabilization delay before its
//! readings mean anything. [`WarmupScheduler::start`] kicks that off on the
//! blocking pool so it overlaps image capture and recognition; the pipeline
//! calls [`WarmupHandle::join`] right before it reads the sensor.
//!
//! Reads only exist on [`ReadySensor`], which only `join` produces, so a
//! read before warm-up cannot be written. The sensor handle is released
//! when the `ReadySensor` is dropped; a `WarmupHandle` dropped before it was
//! joined hands its pending task to the runtime, which releases the sensor
//! once initialization finishes.

use crate::collaborators::{GasSensor, SensorHandle};
use crate::error::WarmupError;
use driveguard_types::{CollaboratorError, SensorReading};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

type InitTask = JoinHandle<Result<SensorHandle, CollaboratorError>>;

/// Launches sensor initialization without blocking the caller.
pub struct WarmupScheduler;

impl WarmupScheduler {
    /// Start initializing `sensor` on the blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(sensor: Arc<dyn GasSensor>, warmup: bool) -> WarmupHandle {
        let task_sensor = Arc::clone(&sensor);
        let task = tokio::task::spawn_blocking(move || {
            tracing::info!(warmup, "gas sensor warm-up started");
            task_sensor.initialize(warmup)
        });
        WarmupHandle {
            sensor,
            task: Some(task),
            started_at: Instant::now(),
        }
    }
}

/// The single warm-up task of an attempt. Joinable once.
pub struct WarmupHandle {
    sensor: Arc<dyn GasSensor>,
    task: Option<InitTask>,
    started_at: Instant,
}

impl WarmupHandle {
    pub fn is_joined(&self) -> bool {
        self.task.is_none()
    }

    /// Whether initialization has finished (successfully or not).
    pub fn is_ready(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Wait for initialization and return the ready sensor.
    ///
    /// A second call fails with [`WarmupError::AlreadyJoined`]; warm-up is
    /// not restartable. Cancel-safe: if the returned future is dropped
    /// before completion the task stays with the handle.
    pub async fn join(&mut self) -> Result<ReadySensor, WarmupError> {
        let task = self.task.as_mut().ok_or(WarmupError::AlreadyJoined)?;
        let waited_from = Instant::now();
        let joined = task.await;
        self.task = None;
        let result = joined.map_err(|e| WarmupError::TaskFailed(e.to_string()))?;

        tracing::info!(
            total_ms = self.started_at.elapsed().as_millis() as u64,
            blocked_ms = waited_from.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "gas sensor warm-up joined"
        );

        let handle = result.map_err(WarmupError::Initialization)?;
        Ok(ReadySensor {
            sensor: Arc::clone(&self.sensor),
            handle: Some(handle),
        })
    }

    /// Wait for a pending warm-up and release whatever it produced.
    ///
    /// Used when the attempt ends before the sensor was needed.
    pub async fn abandon(mut self) {
        if self.is_joined() {
            return;
        }
        match self.join().await {
            Ok(ready) => ready.release(),
            Err(e) => tracing::warn!(error = %e, "abandoned warm-up did not produce a sensor"),
        }
    }
}

impl Drop for WarmupHandle {
    fn drop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let sensor = Arc::clone(&self.sensor);
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move {
                    if let Ok(Ok(handle)) = task.await {
                        sensor.release(handle);
                        tracing::debug!("released sensor from dropped warm-up handle");
                    }
                });
            }
            Err(_) => {
                tracing::error!("warm-up handle dropped outside a runtime; sensor not released");
            }
        }
    }
}

/// An initialized sensor. Released on drop.
pub struct ReadySensor {
    sensor: Arc<dyn GasSensor>,
    handle: Option<SensorHandle>,
}

impl ReadySensor {
    pub fn read(&self) -> Result<SensorReading, CollaboratorError> {
        match &self.handle {
            Some(handle) => self.sensor.read(handle),
            None => Err(CollaboratorError::HardwareFault(
                "sensor handle already released".into(),
            )),
        }
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.sensor.release(handle);
        }
    }
}

impl Drop for ReadySensor {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowSensor {
        delay: Duration,
        fail: bool,
        released: AtomicUsize,
    }

    impl SlowSensor {
        fn new(delay_ms: u64, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(delay_ms),
                fail,
                released: AtomicUsize::new(0),
            })
        }
    }

    impl GasSensor for SlowSensor {
        fn initialize(&self, warmup: bool) -> Result<SensorHandle, CollaboratorError> {
            if warmup {
                std::thread::sleep(self.delay);
            }
            if self.fail {
                return Err(CollaboratorError::HardwareFault("spi open failed".into()));
            }
            Ok(SensorHandle::new(7))
        }

        fn read(&self, _handle: &SensorHandle) -> Result<SensorReading, CollaboratorError> {
            Ok(SensorReading::from_raw(120, 450))
        }

        fn release(&self, _handle: SensorHandle) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn start_does_not_block_caller() {
        let sensor = SlowSensor::new(200, false);
        let before = Instant::now();
        let mut handle = WarmupScheduler::start(sensor.clone(), true);
        assert!(before.elapsed() < Duration::from_millis(100));
        assert!(!handle.is_joined());

        let ready = handle.join().await.unwrap();
        assert!(before.elapsed() >= Duration::from_millis(200));
        assert!(!ready.read().unwrap().detected);
        drop(ready);
        assert_eq!(sensor.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_join_fails_loudly() {
        let sensor = SlowSensor::new(0, false);
        let mut handle = WarmupScheduler::start(sensor, false);
        let _ready = handle.join().await.unwrap();
        assert!(matches!(handle.join().await, Err(WarmupError::AlreadyJoined)));
    }

    #[tokio::test]
    async fn initialization_error_propagates() {
        let sensor = SlowSensor::new(0, true);
        let mut handle = WarmupScheduler::start(sensor, false);
        match handle.join().await {
            Err(WarmupError::Initialization(CollaboratorError::HardwareFault(_))) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected initialization failure"),
        }
    }

    #[tokio::test]
    async fn abandon_releases_sensor() {
        let sensor = SlowSensor::new(50, false);
        let handle = WarmupScheduler::start(sensor.clone(), true);
        handle.abandon().await;
        assert_eq!(sensor.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_handle_releases_sensor_eventually() {
        let sensor = SlowSensor::new(20, false);
        drop(WarmupScheduler::start(sensor.clone(), true));
        for _ in 0..100 {
            if sensor.released.load(Ordering::SeqCst) == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("sensor was never released");
    }
}
