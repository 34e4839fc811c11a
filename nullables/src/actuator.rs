//! Nullable actuator: records signal changes instead of toggling a relay.

use driveguard_types::{Actuator, ActuatorState, CollaboratorError};
use std::sync::{Arc, Mutex};

/// One call made against the actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Safe,
    Active,
    Released,
}

#[derive(Default)]
struct Line {
    history: Vec<Signal>,
    level: Option<ActuatorState>,
    released: bool,
}

/// Read-only view of a [`NullActuator`], kept by the test after the
/// actuator itself has been moved into the controller.
#[derive(Clone)]
pub struct ActuatorProbe {
    line: Arc<Mutex<Line>>,
}

impl ActuatorProbe {
    /// Every signal, in call order.
    pub fn history(&self) -> Vec<Signal> {
        self.line.lock().unwrap().history.clone()
    }

    /// Current relay level; `None` before the first set call.
    pub fn level(&self) -> Option<ActuatorState> {
        self.line.lock().unwrap().level
    }

    pub fn is_released(&self) -> bool {
        self.line.lock().unwrap().released
    }

    pub fn release_count(&self) -> usize {
        self.history()
            .iter()
            .filter(|s| **s == Signal::Released)
            .count()
    }
}

/// An ignition relay that only remembers what it was told.
pub struct NullActuator {
    line: Arc<Mutex<Line>>,
    fail_active: bool,
    fail_safe: bool,
}

impl NullActuator {
    pub fn new() -> Self {
        Self {
            line: Arc::new(Mutex::new(Line::default())),
            fail_active: false,
            fail_safe: false,
        }
    }

    /// `set_active` reports a hardware fault (the line stays where it was).
    pub fn failing_active(mut self) -> Self {
        self.fail_active = true;
        self
    }

    /// `set_safe` reports a hardware fault.
    pub fn failing_safe(mut self) -> Self {
        self.fail_safe = true;
        self
    }

    pub fn probe(&self) -> ActuatorProbe {
        ActuatorProbe {
            line: Arc::clone(&self.line),
        }
    }

    fn drive(&mut self, signal: Signal, fail: bool) -> Result<(), CollaboratorError> {
        let mut line = self.line.lock().unwrap();
        if line.released {
            return Err(CollaboratorError::HardwareFault("line already released".into()));
        }
        line.history.push(signal);
        if fail {
            return Err(CollaboratorError::HardwareFault(format!("{signal:?} write failed")));
        }
        line.level = Some(match signal {
            Signal::Active => ActuatorState::Allowed,
            _ => ActuatorState::Blocked,
        });
        Ok(())
    }
}

impl Default for NullActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for NullActuator {
    fn set_safe(&mut self) -> Result<(), CollaboratorError> {
        let fail = self.fail_safe;
        self.drive(Signal::Safe, fail)
    }

    fn set_active(&mut self) -> Result<(), CollaboratorError> {
        let fail = self.fail_active;
        self.drive(Signal::Active, fail)
    }

    fn release(&mut self) -> Result<(), CollaboratorError> {
        let mut line = self.line.lock().unwrap();
        line.history.push(Signal::Released);
        line.released = true;
        Ok(())
    }
}
