//! Built-in driver implementations.
//!
//! - [`simulation`] - Dry-run servo output and simulated reed switches
//! - [`none`] - Sensor source for installations without reed switches
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `ServoOutput` (wrapped in `ServoActuator`) or `SensorSource`
//! 3. Register its factory in [`register_builtin_drivers`]

pub mod none;
pub mod simulation;

use crate::driver_registry::DriverRegistry;
use smartlock_common::hal::consts::{NO_SENSORS_DRIVER, SIMULATION_DRIVER};
use smartlock_common::hal::driver::HalError;

/// Register all built-in drivers into `registry`.
pub fn register_builtin_drivers(registry: &mut DriverRegistry) -> Result<(), HalError> {
    registry.register_actuator(SIMULATION_DRIVER, simulation::create_actuator)?;
    registry.register_sensors(SIMULATION_DRIVER, simulation::create_sensors)?;
    registry.register_sensors(NO_SENSORS_DRIVER, none::create_sensors)?;
    Ok(())
}
