//! Nullable gas sensor: scripted readings with an optional warm-up delay.

use driveguard_types::params::ALCOHOL_THRESHOLD;
use driveguard_types::{CollaboratorError, SensorReading};
use driveguard_verification::{GasSensor, SensorHandle};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// A gas sensor that always reads the same raw value.
///
/// Tracks how many handles were opened and released so tests can assert
/// nothing leaks.
pub struct NullGasSensor {
    raw_value: u16,
    threshold: u16,
    warmup_delay: Duration,
    init_error: Option<CollaboratorError>,
    read_error: Option<CollaboratorError>,
    next_id: AtomicU64,
    initialized: AtomicUsize,
    reads: AtomicUsize,
    released: AtomicUsize,
}

impl NullGasSensor {
    pub fn new(raw_value: u16) -> Self {
        Self {
            raw_value,
            threshold: ALCOHOL_THRESHOLD,
            warmup_delay: Duration::ZERO,
            init_error: None,
            read_error: None,
            next_id: AtomicU64::new(1),
            initialized: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Sleep this long in `initialize` when warm-up is requested.
    pub fn with_warmup_delay(mut self, delay: Duration) -> Self {
        self.warmup_delay = delay;
        self
    }

    pub fn with_threshold(mut self, threshold: u16) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn failing_init(mut self, error: CollaboratorError) -> Self {
        self.init_error = Some(error);
        self
    }

    pub fn failing_read(mut self, error: CollaboratorError) -> Self {
        self.read_error = Some(error);
        self
    }

    pub fn initialized(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Handles opened but not yet released.
    pub fn outstanding(&self) -> usize {
        self.initialized() - self.released()
    }
}

impl GasSensor for NullGasSensor {
    fn initialize(&self, warmup: bool) -> Result<SensorHandle, CollaboratorError> {
        if warmup && !self.warmup_delay.is_zero() {
            std::thread::sleep(self.warmup_delay);
        }
        if let Some(e) = &self.init_error {
            return Err(e.clone());
        }
        self.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(SensorHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn read(&self, _handle: &SensorHandle) -> Result<SensorReading, CollaboratorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.read_error {
            return Err(e.clone());
        }
        Ok(SensorReading::from_raw(self.raw_value, self.threshold))
    }

    fn release(&self, handle: SensorHandle) {
        tracing::trace!(handle = handle.id(), "null sensor released");
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
