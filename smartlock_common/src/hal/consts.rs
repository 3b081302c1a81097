//! Hardware defaults.
//!
//! Values match an MG996R-class standard servo driving a thumb-turn through
//! a momentary sweep from a neutral position.

/// Driver name of the software simulation back-end.
pub const SIMULATION_DRIVER: &str = "simulation";

/// Driver name for "no sensors installed".
pub const NO_SENSORS_DRIVER: &str = "none";

/// Default servo PWM pin (BCM numbering).
pub const DEFAULT_SERVO_PIN: u8 = 12;

/// Default minimum pulse width [s].
pub const DEFAULT_MIN_PULSE_WIDTH: f64 = 0.0005;

/// Default maximum pulse width [s].
pub const DEFAULT_MAX_PULSE_WIDTH: f64 = 0.0025;

/// Resting angle that leaves the thumb-turn free for manual operation [deg].
pub const DEFAULT_NEUTRAL_ANGLE: f64 = 0.0;

/// Sweep target for locking [deg].
pub const DEFAULT_LOCK_ANGLE: f64 = -85.0;

/// Sweep target for unlocking [deg].
pub const DEFAULT_UNLOCK_ANGLE: f64 = 85.0;

/// Estimated travel time between neutral and target [s].
pub const DEFAULT_MOVE_TIME: f64 = 0.5;

/// Time spent holding the target angle [s].
pub const DEFAULT_HOLD_TIME: f64 = 0.5;

/// Mechanical angle range of the servo [deg].
pub const MIN_ANGLE: f64 = -90.0;

/// Mechanical angle range of the servo [deg].
pub const MAX_ANGLE: f64 = 90.0;

/// Tolerance used when matching a commanded angle to a preset [deg].
pub const ANGLE_EPSILON: f64 = 1e-6;
