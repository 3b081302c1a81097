//! Momentary servo actuation.
//!
//! The servo rests at a neutral angle so the thumb-turn can still be
//! operated by hand. An actuation sweeps to the lock or unlock preset, holds
//! there, returns to neutral and finally detaches (stops the PWM signal).
//! Detach runs on every exit path, including failed steps.

use parking_lot::Mutex;
use smartlock_common::hal::config::ServoConfig;
use smartlock_common::hal::driver::{Actuator, HalError, LockAction};
use std::ops::{Deref, DerefMut};
use std::thread;
use tracing::{debug, info, warn};

/// Low-level PWM output of a servo.
///
/// This is the seam to the commodity pulse-width driver.
pub trait ServoOutput: Send {
    /// Command the servo to `angle` degrees.
    fn set_angle(&mut self, angle: f64) -> Result<(), HalError>;

    /// Stop driving the servo so it can be turned by hand.
    fn detach(&mut self) -> Result<(), HalError>;

    /// Release the output device. Defaults to `detach()`.
    fn close(&mut self) -> Result<(), HalError> {
        self.detach()
    }
}

/// Detaches the wrapped output when dropped.
struct DetachGuard<'a, O: ServoOutput>(&'a mut O);

impl<O: ServoOutput> Deref for DetachGuard<'_, O> {
    type Target = O;

    fn deref(&self) -> &O {
        self.0
    }
}

impl<O: ServoOutput> DerefMut for DetachGuard<'_, O> {
    fn deref_mut(&mut self) -> &mut O {
        self.0
    }
}

impl<O: ServoOutput> Drop for DetachGuard<'_, O> {
    fn drop(&mut self) {
        match self.0.detach() {
            Ok(()) => debug!("Servo detached"),
            Err(e) => warn!("Servo detach failed: {}", e),
        }
    }
}

/// `Actuator` implementation driving a standard angle servo.
pub struct ServoActuator<O: ServoOutput> {
    name: &'static str,
    config: ServoConfig,
    dry_run: bool,
    /// `None` after shutdown.
    output: Mutex<Option<O>>,
}

impl<O: ServoOutput> ServoActuator<O> {
    /// Wrap `output` with the given servo timing and angle presets.
    pub fn new(name: &'static str, config: ServoConfig, output: O, dry_run: bool) -> Self {
        Self {
            name,
            config,
            dry_run,
            output: Mutex::new(Some(output)),
        }
    }

    /// Park the servo at neutral and detach.
    ///
    /// # Errors
    /// Returns `HalError::InitFailed` if the output rejects the neutral angle.
    pub fn init(&self) -> Result<(), HalError> {
        let mut slot = self.output.lock();
        let output = slot.as_mut().ok_or(HalError::NotInitialized(self.name))?;
        let mut output = DetachGuard(output);
        output.set_angle(self.config.neutral_angle).map_err(|e| {
            HalError::InitFailed(format!("servo on GPIO {}: {}", self.config.pin, e))
        })?;
        info!(
            "Servo initialized: GPIO {}, neutral={:.1}, lock={:.1}, unlock={:.1}, dry_run={}",
            self.config.pin,
            self.config.neutral_angle,
            self.config.lock_angle,
            self.config.unlock_angle,
            self.dry_run
        );
        Ok(())
    }

    /// Neutral → target → hold → neutral, detaching on every exit path.
    fn sweep(&self, target_angle: f64) -> Result<(), HalError> {
        let mut slot = self.output.lock();
        let output = slot.as_mut().ok_or(HalError::NotInitialized(self.name))?;
        let mut output = DetachGuard(output);

        debug!("Move: {:.1} -> {:.1}", self.config.neutral_angle, target_angle);
        output.set_angle(target_angle)?;
        thread::sleep(self.config.move_duration() + self.config.hold_duration());

        debug!("Return: {:.1} -> {:.1}", target_angle, self.config.neutral_angle);
        output.set_angle(self.config.neutral_angle)?;
        thread::sleep(self.config.move_duration());

        Ok(())
    }
}

impl<O: ServoOutput> Actuator for ServoActuator<O> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn actuate(&self, action: LockAction) -> Result<LockAction, HalError> {
        let target = self.config.target_angle(action);
        info!("Servo {} sweep: target {:.1} deg", action, target);
        self.sweep(target)?;
        Ok(action)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn shutdown(&self) -> Result<(), HalError> {
        let Some(mut output) = self.output.lock().take() else {
            return Ok(());
        };
        output.close()?;
        info!("Servo released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Step {
        Angle(f64),
        Detach,
        Close,
    }

    /// Output that records every command and can fail at a given angle.
    struct RecordingOutput {
        steps: Arc<parking_lot::Mutex<Vec<Step>>>,
        fail_at: Option<f64>,
    }

    impl ServoOutput for RecordingOutput {
        fn set_angle(&mut self, angle: f64) -> Result<(), HalError> {
            if self.fail_at == Some(angle) {
                return Err(HalError::CommunicationError("pwm write failed".to_string()));
            }
            self.steps.lock().push(Step::Angle(angle));
            Ok(())
        }

        fn detach(&mut self) -> Result<(), HalError> {
            self.steps.lock().push(Step::Detach);
            Ok(())
        }

        fn close(&mut self) -> Result<(), HalError> {
            self.steps.lock().push(Step::Close);
            Ok(())
        }
    }

    fn fast_config() -> ServoConfig {
        ServoConfig {
            move_time: 0.0,
            hold_time: 0.0,
            ..ServoConfig::default()
        }
    }

    fn actuator(fail_at: Option<f64>) -> (ServoActuator<RecordingOutput>, Arc<parking_lot::Mutex<Vec<Step>>>) {
        let steps = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let output = RecordingOutput {
            steps: Arc::clone(&steps),
            fail_at,
        };
        (ServoActuator::new("test", fast_config(), output, true), steps)
    }

    #[test]
    fn test_lock_sweep_sequence() {
        let (servo, steps) = actuator(None);
        assert_eq!(servo.actuate(LockAction::Lock).unwrap(), LockAction::Lock);
        assert_eq!(
            *steps.lock(),
            vec![Step::Angle(-85.0), Step::Angle(0.0), Step::Detach]
        );
    }

    #[test]
    fn test_unlock_sweep_sequence() {
        let (servo, steps) = actuator(None);
        assert_eq!(servo.actuate(LockAction::Unlock).unwrap(), LockAction::Unlock);
        assert_eq!(
            *steps.lock(),
            vec![Step::Angle(85.0), Step::Angle(0.0), Step::Detach]
        );
    }

    #[test]
    fn test_detach_runs_when_move_fails() {
        let (servo, steps) = actuator(Some(-85.0));
        let err = servo.actuate(LockAction::Lock).unwrap_err();
        assert!(matches!(err, HalError::CommunicationError(_)));
        assert_eq!(*steps.lock(), vec![Step::Detach]);
    }

    #[test]
    fn test_detach_runs_when_return_fails() {
        let (servo, steps) = actuator(Some(0.0));
        assert!(servo.actuate(LockAction::Unlock).is_err());
        assert_eq!(*steps.lock(), vec![Step::Angle(85.0), Step::Detach]);
    }

    #[test]
    fn test_init_parks_at_neutral() {
        let (servo, steps) = actuator(None);
        servo.init().unwrap();
        assert_eq!(*steps.lock(), vec![Step::Angle(0.0), Step::Detach]);
    }

    #[test]
    fn test_shutdown_closes_once_and_rejects_further_actuation() {
        let (servo, steps) = actuator(None);
        servo.shutdown().unwrap();
        servo.shutdown().unwrap();
        assert_eq!(*steps.lock(), vec![Step::Close]);
        assert!(matches!(
            servo.actuate(LockAction::Lock),
            Err(HalError::NotInitialized("test"))
        ));
    }
}
