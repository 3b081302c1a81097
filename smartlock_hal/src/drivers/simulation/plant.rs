//! Simulated lock mechanism and door.

use smartlock_common::hal::config::SimulationConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Physical state shared by the simulated servo and reed switches.
#[derive(Debug)]
pub struct SimulatedPlant {
    locked: AtomicBool,
    door_closed: AtomicBool,
}

impl SimulatedPlant {
    /// Create a plant in the configured initial state.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            locked: AtomicBool::new(config.initial_locked),
            door_closed: AtomicBool::new(config.initial_door_closed),
        }
    }

    /// Bolt thrown.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    /// Move the bolt.
    pub fn set_locked(&self, locked: bool) {
        if self.locked.swap(locked, Ordering::SeqCst) != locked {
            debug!("Simulated bolt {}", if locked { "thrown" } else { "retracted" });
        }
    }

    /// Door closed.
    pub fn is_door_closed(&self) -> bool {
        self.door_closed.load(Ordering::SeqCst)
    }

    /// Open or close the door.
    pub fn set_door_closed(&self, closed: bool) {
        if self.door_closed.swap(closed, Ordering::SeqCst) != closed {
            debug!("Simulated door {}", if closed { "closed" } else { "opened" });
        }
    }
}

impl Default for SimulatedPlant {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}
