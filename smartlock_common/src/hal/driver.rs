//! Driver traits and error types.
//!
//! This module defines:
//! - `Actuator` trait - the momentary lock actuator (servo)
//! - `SensorSource` trait - reed switches on the bolt and the door
//! - `LockAction` enum - what an actuation does
//! - `HalError` enum - error types for hardware operations

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error types for hardware operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Actuation did not complete
    #[error("Actuation failed: {0}")]
    ActuationFailed(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Driver used after shutdown
    #[error("Driver not initialized: {0}")]
    NotInitialized(&'static str),
}

/// Direction of a momentary actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockAction {
    /// Throw the bolt.
    #[serde(rename = "locked")]
    Lock,
    /// Retract the bolt.
    #[serde(rename = "unlocked")]
    Unlock,
}

impl LockAction {
    /// Lock state reached once the action has completed.
    #[inline]
    pub const fn target_locked(self) -> bool {
        matches!(self, Self::Lock)
    }

    /// Past-tense tag reported to clients (`"locked"` / `"unlocked"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lock => "locked",
            Self::Unlock => "unlocked",
        }
    }
}

impl fmt::Display for LockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A momentary lock actuator.
///
/// One call performs the whole sweep: drive to the target angle, hold,
/// return to neutral and release. The call blocks for the full movement.
///
/// # Contract
///
/// | Operation | Blocking | Notes |
/// |-----------|----------|-------|
/// | `actuate()` | `move_time * 2 + hold_time` | Output released on every exit path |
/// | `shutdown()` | short | Releases the output, further actuations fail |
///
/// Implementations serialize their own calls, but callers must not rely on
/// that for ordering between independent requests.
pub trait Actuator: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Perform one momentary actuation and report the completed action.
    ///
    /// # Errors
    /// Returns `HalError::ActuationFailed` or `HalError::CommunicationError`
    /// when the movement could not be driven. The output is still released.
    fn actuate(&self, action: LockAction) -> Result<LockAction, HalError>;

    /// Whether this actuator only simulates movement.
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Release the output and stop accepting actuations.
    fn shutdown(&self) -> Result<(), HalError> {
        Ok(())
    }
}

/// Reed switch inputs.
///
/// Lock switch: ON => locked, OFF => unlocked.
/// Door switch: ON => closed, OFF => open.
///
/// `None` means the switch is not installed or could not be read. It is a
/// first-class value and must never be treated as `false`.
pub trait SensorSource: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation", "none").
    fn name(&self) -> &'static str;

    /// Raw lock switch state.
    fn lock_switch_on(&self) -> Option<bool>;

    /// Raw door switch state.
    fn door_switch_on(&self) -> Option<bool>;

    /// Bolt thrown, if known.
    fn is_locked(&self) -> Option<bool> {
        self.lock_switch_on()
    }

    /// Door closed, if known.
    fn is_door_closed(&self) -> Option<bool> {
        self.door_switch_on()
    }

    /// Door confirmed open. Unknown door state yields `false`.
    fn is_door_open(&self) -> bool {
        self.door_switch_on() == Some(false)
    }

    /// Release input devices.
    fn shutdown(&self) {}
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn actuate(&self, action: LockAction) -> Result<LockAction, HalError> {
        (**self).actuate(action)
    }

    fn is_dry_run(&self) -> bool {
        (**self).is_dry_run()
    }

    fn shutdown(&self) -> Result<(), HalError> {
        (**self).shutdown()
    }
}

impl<S: SensorSource + ?Sized> SensorSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn lock_switch_on(&self) -> Option<bool> {
        (**self).lock_switch_on()
    }

    fn door_switch_on(&self) -> Option<bool> {
        (**self).door_switch_on()
    }

    fn shutdown(&self) {
        (**self).shutdown();
    }
}

impl<S: SensorSource + ?Sized> SensorSource for std::sync::Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn lock_switch_on(&self) -> Option<bool> {
        (**self).lock_switch_on()
    }

    fn door_switch_on(&self) -> Option<bool> {
        (**self).door_switch_on()
    }

    fn shutdown(&self) {
        (**self).shutdown();
    }
}
