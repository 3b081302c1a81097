//! The lock state coordinator.
//!
//! `LockCoordinator` owns `LockState` and serializes every actuation. It is
//! shared through `Arc` between HTTP handlers and the auto-lock loop.
//!
//! Lock order is actuation → state. The state lock is only held to copy or
//! update `LockState`; sensor reads and servo sweeps happen outside it.

use crate::clock::Clock;
use crate::confirm::{ConfirmPolicy, Confirmation, wait_for_lock_state};
use crate::error::LockError;
use crate::state::{EffectiveLock, LockSnapshot, LockState, clamp_auto_lock_seconds};
use parking_lot::Mutex;
use smartlock_common::config::FeaturesConfig;
use smartlock_common::hal::driver::{Actuator, LockAction, SensorSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Behavioural settings for a coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorConfig {
    /// Initial auto-lock period [s]; 0 disables.
    pub auto_lock_seconds: f64,
    /// Post-actuation confirm-wait.
    pub confirm: ConfirmPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            auto_lock_seconds: 0.0,
            confirm: ConfirmPolicy::disabled(),
        }
    }
}

impl From<&FeaturesConfig> for CoordinatorConfig {
    fn from(features: &FeaturesConfig) -> Self {
        Self {
            auto_lock_seconds: features.auto_lock_seconds,
            confirm: ConfirmPolicy::from(features),
        }
    }
}

/// Completed lock or unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionResult {
    /// What the actuator did.
    pub action: LockAction,
    /// Confirm-wait outcome, `None` when confirm-wait is disabled.
    pub confirmation: Option<Confirmation>,
}

/// Single owner of lock state and actuation.
pub struct LockCoordinator {
    actuator: Arc<dyn Actuator>,
    sensors: Arc<dyn SensorSource>,
    clock: Arc<dyn Clock>,
    confirm: ConfirmPolicy,
    actuation: Mutex<()>,
    state: Mutex<LockState>,
}

impl LockCoordinator {
    /// Build a coordinator. The virtual lock state is seeded from the first
    /// lock switch reading.
    pub fn new(
        actuator: Arc<dyn Actuator>,
        sensors: Arc<dyn SensorSource>,
        clock: Arc<dyn Clock>,
        config: CoordinatorConfig,
    ) -> Self {
        let initial = sensors.is_locked();
        let state = LockState::new(initial, config.auto_lock_seconds);
        info!(
            "Lock coordinator ready: actuator={}, sensors={}, initial_locked={:?}, auto_lock={}s, confirm_timeout={:?}",
            actuator.name(),
            sensors.name(),
            initial,
            state.auto_lock_seconds,
            config.confirm.timeout
        );
        Self {
            actuator,
            sensors,
            clock,
            confirm: config.confirm,
            actuation: Mutex::new(()),
            state: Mutex::new(state),
        }
    }

    /// Consistent status view. Never waits for a sweep in progress.
    pub fn snapshot(&self) -> LockSnapshot {
        let lock_switch_on = self.sensors.lock_switch_on();
        let door_switch_on = self.sensors.door_switch_on();
        let state = self.state();
        LockSnapshot::build(lock_switch_on, door_switch_on, &state, self.clock.now())
    }

    /// Fused lock state: the lock switch when known, the virtual state otherwise.
    pub fn effective_lock(&self) -> EffectiveLock {
        let sensor = self.sensors.is_locked();
        let virtual_locked = self.state.lock().virtual_locked;
        EffectiveLock::fuse(sensor, virtual_locked)
    }

    /// Throw the bolt.
    ///
    /// # Errors
    /// `LockError::DoorOpen` if the door switch reports the door open, either
    /// at invocation or once the actuation lock is held. The actuator is not
    /// touched in that case. `LockError::Actuator` if the sweep failed; lock
    /// state is left unchanged.
    pub fn lock(&self) -> Result<ActionResult, LockError> {
        if self.sensors.is_door_open() {
            warn!("Lock refused: door is open");
            return Err(LockError::DoorOpen);
        }
        self.actuate(LockAction::Lock)
    }

    /// Retract the bolt and restart the auto-lock timer.
    ///
    /// # Errors
    /// `LockError::Actuator` if the sweep failed; lock state is left unchanged.
    pub fn unlock(&self) -> Result<ActionResult, LockError> {
        self.actuate(LockAction::Unlock)
    }

    /// Lock when confirmed unlocked, unlock otherwise.
    ///
    /// # Errors
    /// Whatever the chosen operation returns.
    pub fn toggle(&self) -> Result<ActionResult, LockError> {
        let effective = self.effective_lock();
        debug!(
            "Toggle from locked={:?} (source={:?})",
            effective.locked, effective.source
        );
        match effective.locked {
            Some(false) => self.lock(),
            _ => self.unlock(),
        }
    }

    /// Change the auto-lock period. Negative or non-finite values disable it.
    /// Returns the stored value.
    pub fn set_auto_lock_seconds(&self, seconds: f64) -> f64 {
        let clamped = clamp_auto_lock_seconds(seconds);
        self.state.lock().auto_lock_seconds = clamped;
        info!("Auto-lock set to {}s (requested {})", clamped, seconds);
        clamped
    }

    /// Copy of the current state.
    pub fn state(&self) -> LockState {
        *self.state.lock()
    }

    /// Sensor source in use.
    pub fn sensors(&self) -> &dyn SensorSource {
        &*self.sensors
    }

    /// Time source in use.
    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Record a lock switch reading taken by the auto-lock loop.
    ///
    /// A known reading is mirrored into the virtual state. `unlocked_edge`
    /// restarts the auto-lock timer at `now`. Returns the updated state.
    pub(crate) fn observe_lock_switch(
        &self,
        reading: Option<bool>,
        unlocked_edge: bool,
        now: Duration,
    ) -> LockState {
        let mut state = self.state.lock();
        if let Some(locked) = reading {
            state.virtual_locked = Some(locked);
        }
        if unlocked_edge {
            state.last_unlock = Some(now);
        }
        *state
    }

    /// Lock on behalf of the auto-lock loop.
    ///
    /// The auto-lock conditions (bolt reads retracted, door reads closed,
    /// idle period elapsed) are evaluated again once the actuation lock is
    /// held. A sweep that completed while waiting, such as a user unlock
    /// restarting the timer, cancels the attempt with `Ok(None)`. After an
    /// attempt the timer restarts whatever the outcome.
    ///
    /// # Errors
    /// `LockError::Actuator` if the sweep failed.
    pub(crate) fn lock_if_auto_lock_due(&self) -> Result<Option<ActionResult>, LockError> {
        let _actuation = self.actuation.lock();

        let lock_reading = self.sensors.is_locked();
        let door_closed = self.sensors.is_door_closed();
        let due = self.state.lock().auto_lock_due(self.clock.now());
        if lock_reading != Some(false) || door_closed != Some(true) || !due {
            debug!(
                "Auto-lock no longer due (lock={:?}, door_closed={:?}, due={})",
                lock_reading, door_closed, due
            );
            return Ok(None);
        }

        let result = self.sweep(LockAction::Lock);
        self.state.lock().last_unlock = Some(self.clock.now());
        result.map(Some)
    }

    fn actuate(&self, action: LockAction) -> Result<ActionResult, LockError> {
        let _actuation = self.actuation.lock();

        // The door may have opened while waiting for a previous sweep.
        if action == LockAction::Lock && self.sensors.is_door_open() {
            warn!("Lock refused: door is open");
            return Err(LockError::DoorOpen);
        }

        self.sweep(action)
    }

    /// Drive the servo, confirm and record. Caller holds `actuation`.
    fn sweep(&self, action: LockAction) -> Result<ActionResult, LockError> {
        info!("Actuating: {}", action);
        let done = self.actuator.actuate(action).map_err(|e| {
            error!("Actuation '{}' failed: {}", action, e);
            LockError::from(e)
        })?;

        let target = done.target_locked();
        let confirmation = self
            .confirm
            .is_enabled()
            .then(|| wait_for_lock_state(&*self.sensors, &*self.clock, target, self.confirm));
        if let Some(c) = confirmation.filter(|c| !c.confirmed) {
            warn!(
                "Actuation '{}' not confirmed ({:?}, observed locked={:?})",
                done, c.source, c.observed_locked
            );
        }

        let now = self.clock.now();
        {
            let mut state = self.state.lock();
            state.virtual_locked = Some(target);
            if done == LockAction::Unlock {
                state.last_unlock = Some(now);
            }
        }

        info!("Actuation complete: {}", done);
        Ok(ActionResult {
            action: done,
            confirmation,
        })
    }
}
