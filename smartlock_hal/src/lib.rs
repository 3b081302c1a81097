//! # SmartLock HAL Library
//!
//! Hardware layer for the lock: the momentary servo sequence, reed switch
//! back-ends and the registry that picks them at startup.
//!
//! Drivers implement the `Actuator` / `SensorSource` traits defined in
//! `smartlock_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`servo`] - `ServoActuator`: move → hold → return → detach over a `ServoOutput`
//! - [`filter`] - `GlitchFilter` sensor decorator
//! - [`driver_registry`] - Driver factory registration and hardware assembly
//! - [`drivers`] - Built-in driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         smartlock_hal                          │
//! │  ┌────────────────┐    ┌───────────────┐    ┌───────────────┐  │
//! │  │ DriverRegistry │───►│ ServoActuator │───►│ ServoOutput   │  │
//! │  │                │    │ (Actuator)    │    │ (PWM seam)    │  │
//! │  │                │    └───────────────┘    └───────────────┘  │
//! │  │                │    ┌───────────────┐    ┌───────────────┐  │
//! │  │                │───►│ GlitchFilter  │───►│ SensorSource  │  │
//! │  └────────────────┘    └───────────────┘    └───────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;
pub mod filter;
pub mod servo;

// Re-export key types for convenience
pub use crate::driver_registry::{DriverContext, DriverRegistry, Hardware, build_hardware};
pub use crate::filter::GlitchFilter;
pub use crate::servo::{ServoActuator, ServoOutput};
