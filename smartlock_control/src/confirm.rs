//! Post-actuation confirm-wait.
//!
//! After a sweep the lock switch is polled until it agrees with the
//! commanded state or the deadline passes. Neither outcome is an error; the
//! result is reported to the caller as a [`Confirmation`].

use crate::clock::Clock;
use serde::Serialize;
use smartlock_common::config::FeaturesConfig;
use smartlock_common::hal::driver::SensorSource;
use std::time::Duration;
use tracing::debug;

/// How a confirm-wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmSource {
    /// The lock switch reported the expected state.
    Sensor,
    /// The deadline passed first.
    Timeout,
    /// No lock switch to ask.
    NoSensor,
}

/// Outcome of a confirm-wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// The switch agreed before the deadline.
    pub confirmed: bool,
    /// Last lock switch reading.
    pub observed_locked: Option<bool>,
    /// How the wait ended.
    pub source: ConfirmSource,
}

impl Confirmation {
    const fn no_sensor() -> Self {
        Self {
            confirmed: false,
            observed_locked: None,
            source: ConfirmSource::NoSensor,
        }
    }
}

/// Confirm-wait timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    /// Maximum wait. Zero disables confirm-wait.
    pub timeout: Duration,
    /// Delay between sensor polls.
    pub poll_interval: Duration,
}

impl ConfirmPolicy {
    /// Optimistic updates only.
    pub const fn disabled() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }

    /// Whether a wait happens at all.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        !self.timeout.is_zero()
    }
}

impl From<&FeaturesConfig> for ConfirmPolicy {
    fn from(features: &FeaturesConfig) -> Self {
        Self {
            timeout: features.confirm_timeout(),
            poll_interval: features.confirm_poll_interval(),
        }
    }
}

/// Poll the lock switch until it reads `expected` or `policy.timeout` passes.
///
/// Returns `NoSensor` as soon as the switch reads unknown, including in the
/// middle of a wait.
pub fn wait_for_lock_state(
    sensors: &dyn SensorSource,
    clock: &dyn Clock,
    expected: bool,
    policy: ConfirmPolicy,
) -> Confirmation {
    let deadline = clock.now() + policy.timeout;

    loop {
        let observed = match sensors.is_locked() {
            Some(locked) => locked,
            None => return Confirmation::no_sensor(),
        };

        if observed == expected {
            return Confirmation {
                confirmed: true,
                observed_locked: Some(observed),
                source: ConfirmSource::Sensor,
            };
        }

        let now = clock.now();
        if now >= deadline {
            debug!(
                "Confirm-wait timed out after {:?}: expected locked={}, observed locked={}",
                policy.timeout, expected, observed
            );
            return Confirmation {
                confirmed: false,
                observed_locked: Some(observed),
                source: ConfirmSource::Timeout,
            };
        }

        // A zero poll interval would spin; wait at least 1 ms.
        let step = policy
            .poll_interval
            .max(Duration::from_millis(1))
            .min(deadline - now);
        clock.sleep(step);
    }
}
