//! Fail-safe wrapper around the ignition relay.
//!
//! Relay wiring: safe level = ignition BLOCKED, active level = ignition
//! ALLOWED. The wrapper drives the line safe before construction returns,
//! and [`FailSafeActuator::cleanup`] (also run on drop) forces it safe and
//! releases the line on every exit path.

use crate::error::ActuatorError;
use driveguard_types::{Actuator, ActuatorState};

pub struct FailSafeActuator {
    line: Box<dyn Actuator>,
    state: ActuatorState,
    released: bool,
}

impl FailSafeActuator {
    /// Take ownership of the relay and drive it to the blocked level.
    ///
    /// If the safe write fails the line is released and the error returned;
    /// no actuator exists in that case.
    pub fn new(mut line: Box<dyn Actuator>) -> Result<Self, ActuatorError> {
        if let Err(e) = line.set_safe() {
            tracing::error!(error = %e, "could not drive ignition relay to safe level");
            if let Err(release_err) = line.release() {
                tracing::error!(error = %release_err, "relay release after failed init also failed");
            }
            return Err(ActuatorError::Hardware(e));
        }
        tracing::info!("ignition BLOCKED (default state)");
        Ok(Self {
            line,
            state: ActuatorState::Blocked,
            released: false,
        })
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Allow ignition. Only called on a passing verdict.
    ///
    /// A failed write leaves the actuator blocked.
    pub fn allow(&mut self) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released);
        }
        match self.line.set_active() {
            Ok(()) => {
                self.state = ActuatorState::Allowed;
                tracing::info!("ignition ALLOWED");
                Ok(())
            }
            Err(e) => {
                self.state = ActuatorState::Blocked;
                if let Err(safe_err) = self.line.set_safe() {
                    tracing::error!(error = %safe_err, "relay revert to safe level failed");
                }
                Err(ActuatorError::Hardware(e))
            }
        }
    }

    /// Block ignition. The tracked state is `Blocked` even if the write
    /// fails; the error is still returned.
    pub fn block(&mut self) -> Result<(), ActuatorError> {
        self.state = ActuatorState::Blocked;
        if self.released {
            return Ok(());
        }
        self.line.set_safe().map_err(ActuatorError::Hardware)?;
        tracing::info!("ignition BLOCKED");
        Ok(())
    }

    /// Force blocked and release the relay. Idempotent.
    pub fn cleanup(&mut self) -> Result<(), ActuatorError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.state = ActuatorState::Blocked;

        let safe = self.line.set_safe();
        let release = self.line.release();
        tracing::info!("relay released, ignition safely blocked");
        safe.and(release).map_err(ActuatorError::Hardware)
    }
}

impl Drop for FailSafeActuator {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::error!(error = %e, "relay cleanup on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveguard_nullables::{NullActuator, Signal};

    #[test]
    fn construction_drives_safe_first() {
        let line = NullActuator::new();
        let probe = line.probe();
        let actuator = FailSafeActuator::new(Box::new(line)).unwrap();
        assert_eq!(actuator.state(), ActuatorState::Blocked);
        assert_eq!(probe.history(), vec![Signal::Safe]);
        assert_eq!(probe.level(), Some(ActuatorState::Blocked));
    }

    #[test]
    fn failed_construction_releases_line() {
        let line = NullActuator::new().failing_safe();
        let probe = line.probe();
        assert!(FailSafeActuator::new(Box::new(line)).is_err());
        assert!(probe.is_released());
        assert_ne!(probe.level(), Some(ActuatorState::Allowed));
    }

    #[test]
    fn allow_then_block() {
        let line = NullActuator::new();
        let probe = line.probe();
        let mut actuator = FailSafeActuator::new(Box::new(line)).unwrap();
        actuator.allow().unwrap();
        assert_eq!(actuator.state(), ActuatorState::Allowed);
        assert_eq!(probe.level(), Some(ActuatorState::Allowed));
        actuator.block().unwrap();
        assert_eq!(actuator.state(), ActuatorState::Blocked);
        assert_eq!(probe.level(), Some(ActuatorState::Blocked));
    }

    #[test]
    fn failed_allow_stays_blocked() {
        let line = NullActuator::new().failing_active();
        let probe = line.probe();
        let mut actuator = FailSafeActuator::new(Box::new(line)).unwrap();
        assert!(actuator.allow().is_err());
        assert_eq!(actuator.state(), ActuatorState::Blocked);
        assert_eq!(probe.level(), Some(ActuatorState::Blocked));
    }

    #[test]
    fn cleanup_after_allow_is_blocked_and_idempotent() {
        let line = NullActuator::new();
        let probe = line.probe();
        let mut actuator = FailSafeActuator::new(Box::new(line)).unwrap();
        actuator.allow().unwrap();

        actuator.cleanup().unwrap();
        actuator.cleanup().unwrap();
        assert_eq!(actuator.state(), ActuatorState::Blocked);
        assert!(actuator.is_released());
        assert_eq!(probe.level(), Some(ActuatorState::Blocked));
        assert_eq!(probe.release_count(), 1);

        drop(actuator);
        assert_eq!(probe.release_count(), 1);
    }

    #[test]
    fn allow_after_cleanup_refused() {
        let line = NullActuator::new();
        let probe = line.probe();
        let mut actuator = FailSafeActuator::new(Box::new(line)).unwrap();
        actuator.cleanup().unwrap();
        assert!(matches!(actuator.allow(), Err(ActuatorError::Released)));
        assert_eq!(probe.level(), Some(ActuatorState::Blocked));
    }

    #[test]
    fn drop_releases_allowed_line() {
        let line = NullActuator::new();
        let probe = line.probe();
        {
            let mut actuator = FailSafeActuator::new(Box::new(line)).unwrap();
            actuator.allow().unwrap();
        }
        assert_eq!(
            probe.history(),
            vec![Signal::Safe, Signal::Active, Signal::Safe, Signal::Released]
        );
    }
}
