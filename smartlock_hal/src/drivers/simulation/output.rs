//! Dry-run servo output.

use super::plant::SimulatedPlant;
use crate::servo::ServoOutput;
use smartlock_common::hal::config::ServoConfig;
use smartlock_common::hal::consts::ANGLE_EPSILON;
use smartlock_common::hal::driver::HalError;
use std::sync::Arc;
use tracing::debug;

/// Servo output that only logs angles and moves the simulated bolt.
pub struct SimulatedServoOutput {
    config: ServoConfig,
    plant: Arc<SimulatedPlant>,
    /// Last commanded angle; `None` while detached.
    angle: Option<f64>,
}

impl SimulatedServoOutput {
    /// Create an output linked to `plant`.
    pub fn new(config: ServoConfig, plant: Arc<SimulatedPlant>) -> Self {
        Self {
            config,
            plant,
            angle: None,
        }
    }

    /// Last commanded angle; `None` while detached.
    pub fn angle(&self) -> Option<f64> {
        self.angle
    }
}

impl ServoOutput for SimulatedServoOutput {
    fn set_angle(&mut self, angle: f64) -> Result<(), HalError> {
        debug!("Dry-run: set angle={:.1}", angle);
        self.angle = Some(angle);
        if (angle - self.config.lock_angle).abs() < ANGLE_EPSILON {
            self.plant.set_locked(true);
        } else if (angle - self.config.unlock_angle).abs() < ANGLE_EPSILON {
            self.plant.set_locked(false);
        }
        Ok(())
    }

    fn detach(&mut self) -> Result<(), HalError> {
        self.angle = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartlock_common::hal::config::SimulationConfig;

    #[test]
    fn test_reaching_presets_moves_bolt() {
        let plant = Arc::new(SimulatedPlant::new(&SimulationConfig::default()));
        let mut output = SimulatedServoOutput::new(ServoConfig::default(), Arc::clone(&plant));
        assert!(!plant.is_locked());

        output.set_angle(-85.0).unwrap();
        assert!(plant.is_locked());
        assert_eq!(output.angle(), Some(-85.0));

        // Returning to neutral leaves the bolt where it is.
        output.set_angle(0.0).unwrap();
        assert!(plant.is_locked());

        output.set_angle(85.0).unwrap();
        assert!(!plant.is_locked());

        output.detach().unwrap();
        assert_eq!(output.angle(), None);
    }
}
