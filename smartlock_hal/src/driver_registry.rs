//! Driver registry and hardware assembly.
//!
//! Provides a `DriverRegistry` mapping driver names to factories for
//! actuators and sensor sources, and [`build_hardware`] which selects and
//! constructs both from the service configuration. Constructor-injected, no
//! global state.

use crate::drivers::register_builtin_drivers;
use crate::drivers::simulation::SimulatedPlant;
use crate::filter::GlitchFilter;
use smartlock_common::config::SmartLockConfig;
use smartlock_common::hal::consts::SIMULATION_DRIVER;
use smartlock_common::hal::driver::{Actuator, HalError, SensorSource};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Inputs available to driver factories.
pub struct DriverContext<'a> {
    /// Full service configuration.
    pub config: &'a SmartLockConfig,
    /// Simulated mechanism shared by the simulation drivers.
    pub plant: &'a Arc<SimulatedPlant>,
}

/// Factory function type for actuators.
pub type ActuatorFactory = fn(&DriverContext<'_>) -> Result<Box<dyn Actuator>, HalError>;

/// Factory function type for sensor sources.
pub type SensorFactory = fn(&DriverContext<'_>) -> Result<Box<dyn SensorSource>, HalError>;

/// Registry of available drivers.
pub struct DriverRegistry {
    actuators: HashMap<&'static str, ActuatorFactory>,
    sensors: HashMap<&'static str, SensorFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            actuators: HashMap::new(),
            sensors: HashMap::new(),
        }
    }

    /// Create a registry holding all built-in drivers.
    pub fn with_builtin_drivers() -> Result<Self, HalError> {
        let mut registry = Self::new();
        register_builtin_drivers(&mut registry)?;
        Ok(registry)
    }

    /// Register an actuator factory.
    ///
    /// # Errors
    /// Returns `HalError::ConfigError` if the name is already taken.
    pub fn register_actuator(
        &mut self,
        name: &'static str,
        factory: ActuatorFactory,
    ) -> Result<(), HalError> {
        if self.actuators.insert(name, factory).is_some() {
            return Err(HalError::ConfigError(format!(
                "Actuator driver '{name}' is already registered"
            )));
        }
        Ok(())
    }

    /// Register a sensor source factory.
    ///
    /// # Errors
    /// Returns `HalError::ConfigError` if the name is already taken.
    pub fn register_sensors(
        &mut self,
        name: &'static str,
        factory: SensorFactory,
    ) -> Result<(), HalError> {
        if self.sensors.insert(name, factory).is_some() {
            return Err(HalError::ConfigError(format!(
                "Sensor driver '{name}' is already registered"
            )));
        }
        Ok(())
    }

    /// Create an actuator by driver name.
    ///
    /// # Errors
    /// Returns `HalError::DriverNotFound` if no driver with the given name is registered.
    pub fn create_actuator(
        &self,
        name: &str,
        ctx: &DriverContext<'_>,
    ) -> Result<Box<dyn Actuator>, HalError> {
        let factory = self
            .actuators
            .get(name)
            .ok_or_else(|| HalError::DriverNotFound(format!("actuator '{name}'")))?;
        factory(ctx)
    }

    /// Create a sensor source by driver name.
    ///
    /// # Errors
    /// Returns `HalError::DriverNotFound` if no driver with the given name is registered.
    pub fn create_sensors(
        &self,
        name: &str,
        ctx: &DriverContext<'_>,
    ) -> Result<Box<dyn SensorSource>, HalError> {
        let factory = self
            .sensors
            .get(name)
            .ok_or_else(|| HalError::DriverNotFound(format!("sensors '{name}'")))?;
        factory(ctx)
    }

    /// List registered actuator driver names, sorted.
    pub fn list_actuators(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.actuators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// List registered sensor driver names, sorted.
    pub fn list_sensors(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.sensors.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Constructed hardware handles.
pub struct Hardware {
    /// Lock actuator.
    pub actuator: Arc<dyn Actuator>,
    /// Reed switches.
    pub sensors: Arc<dyn SensorSource>,
    /// Simulated mechanism (only moved by simulation drivers).
    pub plant: Arc<SimulatedPlant>,
}

impl Hardware {
    /// Release actuator and sensors.
    pub fn shutdown(&self) -> Result<(), HalError> {
        self.sensors.shutdown();
        self.actuator.shutdown()
    }
}

/// Select and construct drivers for `config`.
///
/// `dry_run` forces the simulated actuator. A non-zero
/// `sensors.glitch_filter_ms` wraps the sensor source in a [`GlitchFilter`].
///
/// # Errors
/// Returns `HalError::DriverNotFound` for unknown driver names and forwards
/// driver initialization errors.
pub fn build_hardware(
    registry: &DriverRegistry,
    config: &SmartLockConfig,
) -> Result<Hardware, HalError> {
    let plant = Arc::new(SimulatedPlant::new(&config.simulation));
    let ctx = DriverContext {
        config,
        plant: &plant,
    };

    let actuator_driver = if config.dry_run {
        SIMULATION_DRIVER
    } else {
        config.servo.driver.as_str()
    };
    let actuator: Arc<dyn Actuator> = Arc::from(registry.create_actuator(actuator_driver, &ctx)?);

    let raw_sensors = registry.create_sensors(&config.sensors.driver, &ctx)?;
    let window = config.sensors.glitch_filter();
    let sensors: Arc<dyn SensorSource> = if window.is_zero() {
        Arc::from(raw_sensors)
    } else {
        Arc::new(GlitchFilter::new(raw_sensors, window))
    };

    info!(
        "Hardware ready: actuator={} (dry_run={}), sensors={}, glitch_filter={:?}",
        actuator.name(),
        actuator.is_dry_run(),
        sensors.name(),
        window
    );

    Ok(Hardware {
        actuator,
        sensors,
        plant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartlock_common::hal::driver::LockAction;

    struct NullActuator;

    impl Actuator for NullActuator {
        fn name(&self) -> &'static str {
            "null"
        }

        fn actuate(&self, action: LockAction) -> Result<LockAction, HalError> {
            Ok(action)
        }
    }

    fn create_null(_ctx: &DriverContext<'_>) -> Result<Box<dyn Actuator>, HalError> {
        Ok(Box::new(NullActuator))
    }

    #[test]
    fn registry_register_and_create() {
        let mut reg = DriverRegistry::new();
        reg.register_actuator("null", create_null).unwrap();

        let config = SmartLockConfig::default();
        let plant = Arc::new(SimulatedPlant::default());
        let ctx = DriverContext {
            config: &config,
            plant: &plant,
        };
        let actuator = reg.create_actuator("null", &ctx).unwrap();
        assert_eq!(actuator.name(), "null");
    }

    #[test]
    fn registry_driver_not_found() {
        let reg = DriverRegistry::new();
        let config = SmartLockConfig::default();
        let plant = Arc::new(SimulatedPlant::default());
        let ctx = DriverContext {
            config: &config,
            plant: &plant,
        };
        assert!(matches!(
            reg.create_sensors("pigpio", &ctx),
            Err(HalError::DriverNotFound(_))
        ));
    }

    #[test]
    fn registry_duplicate_rejected() {
        let mut reg = DriverRegistry::new();
        reg.register_actuator("dup", create_null).unwrap();
        assert!(reg.register_actuator("dup", create_null).is_err());
    }

    #[test]
    fn builtin_drivers_listed() {
        let reg = DriverRegistry::with_builtin_drivers().unwrap();
        assert_eq!(reg.list_actuators(), vec!["simulation"]);
        assert_eq!(reg.list_sensors(), vec!["none", "simulation"]);
    }
}
