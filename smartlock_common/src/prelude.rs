//! Prelude module for common re-exports.
//!
//! ```rust
//! use smartlock_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SmartLockConfig};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::config::{ReedSwitchConfig, SensorsConfig, ServoConfig, SimulationConfig};
pub use crate::hal::driver::{Actuator, HalError, LockAction, SensorSource};
