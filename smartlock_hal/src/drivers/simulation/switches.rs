//! Simulated reed switches.

use super::plant::SimulatedPlant;
use smartlock_common::hal::config::SensorsConfig;
use smartlock_common::hal::driver::SensorSource;
use std::sync::Arc;
use tracing::info;

/// Reed switches reading the simulated plant.
///
/// A switch whose config section is absent reports `None`.
pub struct SimulatedReedSwitches {
    plant: Arc<SimulatedPlant>,
    lock_installed: bool,
    door_installed: bool,
}

impl SimulatedReedSwitches {
    /// Create switches per `config`, reading from `plant`.
    pub fn new(config: &SensorsConfig, plant: Arc<SimulatedPlant>) -> Self {
        info!(
            "Simulated reed switches: lock={} door={}",
            config
                .lock_switch
                .map_or_else(|| "none".to_string(), |s| format!("GPIO {}", s.pin)),
            config
                .door_switch
                .map_or_else(|| "none".to_string(), |s| format!("GPIO {}", s.pin)),
        );
        Self {
            plant,
            lock_installed: config.lock_switch.is_some(),
            door_installed: config.door_switch.is_some(),
        }
    }
}

impl SensorSource for SimulatedReedSwitches {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn lock_switch_on(&self) -> Option<bool> {
        self.lock_installed.then(|| self.plant.is_locked())
    }

    fn door_switch_on(&self) -> Option<bool> {
        self.door_installed.then(|| self.plant.is_door_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartlock_common::hal::config::{ReedSwitchConfig, SimulationConfig};

    fn config(lock: bool, door: bool) -> SensorsConfig {
        SensorsConfig {
            driver: "simulation".to_string(),
            lock_switch: lock.then_some(ReedSwitchConfig { pin: 23 }),
            door_switch: door.then_some(ReedSwitchConfig { pin: 24 }),
            glitch_filter_ms: 0,
        }
    }

    #[test]
    fn test_installed_switches_follow_plant() {
        let plant = Arc::new(SimulatedPlant::new(&SimulationConfig::default()));
        let switches = SimulatedReedSwitches::new(&config(true, true), Arc::clone(&plant));

        assert_eq!(switches.lock_switch_on(), Some(false));
        assert_eq!(switches.door_switch_on(), Some(true));

        plant.set_locked(true);
        plant.set_door_closed(false);
        assert_eq!(switches.is_locked(), Some(true));
        assert!(switches.is_door_open());
    }

    #[test]
    fn test_missing_switch_reads_unknown() {
        let plant = Arc::new(SimulatedPlant::default());
        let switches = SimulatedReedSwitches::new(&config(true, false), plant);
        assert_eq!(switches.lock_switch_on(), Some(false));
        assert_eq!(switches.door_switch_on(), None);
        assert!(!switches.is_door_open());
    }
}
