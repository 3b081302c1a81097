//! Hardware configuration types.
//!
//! - `ServoConfig` - servo pin, pulse bounds, angle presets and timing
//! - `SensorsConfig` / `ReedSwitchConfig` - reed switch assignment
//! - `SimulationConfig` - initial state of the simulated lock

use crate::config::ConfigError;
use crate::hal::consts::*;
use crate::hal::driver::LockAction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Convert non-negative seconds to a `Duration`, treating invalid input as zero.
pub fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or_default()
}

/// Servo configuration (`[servo]`).
///
/// # TOML Example
///
/// ```toml
/// [servo]
/// pin = 12
/// lock_angle = -85.0
/// unlock_angle = 85.0
/// move_time = 0.5
/// hold_time = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServoConfig {
    /// Actuator driver name.
    pub driver: String,
    /// PWM output pin.
    pub pin: u8,
    /// Minimum pulse width [s].
    pub min_pulse_width: f64,
    /// Maximum pulse width [s].
    pub max_pulse_width: f64,
    /// Resting angle [deg].
    pub neutral_angle: f64,
    /// Lock sweep target [deg].
    pub lock_angle: f64,
    /// Unlock sweep target [deg].
    pub unlock_angle: f64,
    /// Travel time neutral → target [s].
    pub move_time: f64,
    /// Hold time at target [s].
    pub hold_time: f64,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            driver: SIMULATION_DRIVER.to_string(),
            pin: DEFAULT_SERVO_PIN,
            min_pulse_width: DEFAULT_MIN_PULSE_WIDTH,
            max_pulse_width: DEFAULT_MAX_PULSE_WIDTH,
            neutral_angle: DEFAULT_NEUTRAL_ANGLE,
            lock_angle: DEFAULT_LOCK_ANGLE,
            unlock_angle: DEFAULT_UNLOCK_ANGLE,
            move_time: DEFAULT_MOVE_TIME,
            hold_time: DEFAULT_HOLD_TIME,
        }
    }
}

impl ServoConfig {
    /// Sweep target for the given action.
    pub fn target_angle(&self, action: LockAction) -> f64 {
        match action {
            LockAction::Lock => self.lock_angle,
            LockAction::Unlock => self.unlock_angle,
        }
    }

    /// Travel time as a `Duration`.
    pub fn move_duration(&self) -> Duration {
        secs_to_duration(self.move_time)
    }

    /// Hold time as a `Duration`.
    pub fn hold_duration(&self) -> Duration {
        secs_to_duration(self.hold_time)
    }

    /// Total blocking time of one actuation: out, hold, back.
    pub fn actuation_duration(&self) -> Duration {
        self.move_duration() * 2 + self.hold_duration()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `driver` is empty
    /// - pulse widths are not positive or `min_pulse_width >= max_pulse_width`
    /// - any angle lies outside the servo range
    /// - `move_time` or `hold_time` is negative or not finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "servo.driver cannot be empty".to_string(),
            ));
        }
        if !(self.min_pulse_width > 0.0 && self.min_pulse_width < self.max_pulse_width) {
            return Err(ConfigError::ValidationError(format!(
                "servo pulse width bounds invalid: min={} max={}",
                self.min_pulse_width, self.max_pulse_width
            )));
        }
        for (name, angle) in [
            ("neutral_angle", self.neutral_angle),
            ("lock_angle", self.lock_angle),
            ("unlock_angle", self.unlock_angle),
        ] {
            if !(MIN_ANGLE..=MAX_ANGLE).contains(&angle) {
                return Err(ConfigError::ValidationError(format!(
                    "servo.{name}={angle} outside [{MIN_ANGLE}, {MAX_ANGLE}]"
                )));
            }
        }
        for (name, secs) in [("move_time", self.move_time), ("hold_time", self.hold_time)] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "servo.{name} must be a non-negative number of seconds, got {secs}"
                )));
            }
        }
        Ok(())
    }
}

/// A single reed switch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReedSwitchConfig {
    /// GPIO input pin.
    pub pin: u8,
}

/// Sensor configuration (`[sensors]`).
///
/// A switch without a section is treated as not installed.
///
/// # TOML Example
///
/// ```toml
/// [sensors]
/// driver = "simulation"
/// glitch_filter_ms = 20
///
/// [sensors.lock_switch]
/// pin = 23
///
/// [sensors.door_switch]
/// pin = 24
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorsConfig {
    /// Sensor driver name (`none`, `simulation`).
    pub driver: String,
    /// Bolt position switch.
    pub lock_switch: Option<ReedSwitchConfig>,
    /// Door position switch.
    pub door_switch: Option<ReedSwitchConfig>,
    /// Minimum stable time before a changed reading is reported [ms]. 0 disables.
    pub glitch_filter_ms: u64,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            driver: NO_SENSORS_DRIVER.to_string(),
            lock_switch: None,
            door_switch: None,
            glitch_filter_ms: 0,
        }
    }
}

impl SensorsConfig {
    /// Glitch filter window as a `Duration`.
    pub fn glitch_filter(&self) -> Duration {
        Duration::from_millis(self.glitch_filter_ms)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `driver` is empty or both
    /// switches share a pin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sensors.driver cannot be empty".to_string(),
            ));
        }
        if let (Some(lock), Some(door)) = (self.lock_switch, self.door_switch) {
            if lock.pin == door.pin {
                return Err(ConfigError::ValidationError(format!(
                    "lock and door switches share GPIO {}",
                    lock.pin
                )));
            }
        }
        Ok(())
    }
}

/// Initial state of the simulated lock (`[simulation]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Bolt thrown at start.
    pub initial_locked: bool,
    /// Door closed at start.
    pub initial_door_closed: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_locked: false,
            initial_door_closed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servo_defaults_valid() {
        let cfg = ServoConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.pin, 12);
        assert_eq!(cfg.actuation_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_target_angle() {
        let cfg = ServoConfig::default();
        assert_eq!(cfg.target_angle(LockAction::Lock), -85.0);
        assert_eq!(cfg.target_angle(LockAction::Unlock), 85.0);
    }

    #[test]
    fn test_servo_rejects_inverted_pulse_bounds() {
        let cfg = ServoConfig {
            min_pulse_width: 0.0025,
            max_pulse_width: 0.0005,
            ..ServoConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_servo_rejects_out_of_range_angle() {
        let cfg = ServoConfig {
            lock_angle: -120.0,
            ..ServoConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("lock_angle"));
    }

    #[test]
    fn test_servo_rejects_negative_time() {
        let cfg = ServoConfig {
            hold_time: -0.1,
            ..ServoConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_secs_to_duration_clamps() {
        assert_eq!(secs_to_duration(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration(0.25), Duration::from_millis(250));
    }

    #[test]
    fn test_sensors_reject_shared_pin() {
        let cfg = SensorsConfig {
            driver: "simulation".to_string(),
            lock_switch: Some(ReedSwitchConfig { pin: 23 }),
            door_switch: Some(ReedSwitchConfig { pin: 23 }),
            glitch_filter_ms: 0,
        };
        assert!(cfg.validate().is_err());
    }
}
