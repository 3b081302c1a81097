//! Simulation driver module.
//!
//! Software stand-ins for the servo and the reed switches so the service can
//! run without hardware. A shared [`SimulatedPlant`] links them: when the
//! dry-run servo reaches the lock or unlock preset the simulated lock switch
//! follows, like a real bolt would move its magnet past the reed switch.

mod output;
mod plant;
mod switches;

pub use output::SimulatedServoOutput;
pub use plant::SimulatedPlant;
pub use switches::SimulatedReedSwitches;

use crate::driver_registry::DriverContext;
use crate::servo::ServoActuator;
use smartlock_common::hal::consts::SIMULATION_DRIVER;
use smartlock_common::hal::driver::{Actuator, HalError, SensorSource};
use std::sync::Arc;

/// Factory for the simulated (dry-run) servo actuator.
pub fn create_actuator(ctx: &DriverContext<'_>) -> Result<Box<dyn Actuator>, HalError> {
    let servo = &ctx.config.servo;
    let output = SimulatedServoOutput::new(servo.clone(), Arc::clone(ctx.plant));
    let actuator = ServoActuator::new(SIMULATION_DRIVER, servo.clone(), output, true);
    actuator.init()?;
    Ok(Box::new(actuator))
}

/// Factory for the simulated reed switches.
pub fn create_sensors(ctx: &DriverContext<'_>) -> Result<Box<dyn SensorSource>, HalError> {
    Ok(Box::new(SimulatedReedSwitches::new(
        &ctx.config.sensors,
        Arc::clone(ctx.plant),
    )))
}
