//! Lock state, sensor fusion and status snapshots.

use serde::Serialize;
use std::time::Duration;

/// Clamp a requested auto-lock period. Negative or non-finite values disable
/// auto-lock (0).
pub fn clamp_auto_lock_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Mutable state owned by the coordinator.
///
/// Only ever read or written under the coordinator's state lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockState {
    /// Software's belief about the bolt, `None` when unknown.
    pub virtual_locked: Option<bool>,
    /// Idle period before auto-lock [s]; 0 disables.
    pub auto_lock_seconds: f64,
    /// Time of the most recent unlock transition.
    pub last_unlock: Option<Duration>,
}

impl LockState {
    /// Fresh state seeded from the first lock sensor reading.
    pub fn new(initial_locked: Option<bool>, auto_lock_seconds: f64) -> Self {
        Self {
            virtual_locked: initial_locked,
            auto_lock_seconds: clamp_auto_lock_seconds(auto_lock_seconds),
            last_unlock: None,
        }
    }

    /// Whether auto-lock is enabled.
    #[inline]
    pub fn auto_lock_enabled(&self) -> bool {
        self.auto_lock_seconds > 0.0
    }

    /// Seconds since the last unlock, clamped at 0.
    pub fn seconds_since_unlock(&self, now: Duration) -> Option<f64> {
        self.last_unlock
            .map(|at| now.saturating_sub(at).as_secs_f64())
    }

    /// Auto-lock enabled and the idle period has elapsed.
    ///
    /// Sensor conditions (bolt retracted, door closed) are checked by the
    /// caller.
    pub fn auto_lock_due(&self, now: Duration) -> bool {
        self.auto_lock_enabled()
            && self
                .seconds_since_unlock(now)
                .is_some_and(|idle| idle >= self.auto_lock_seconds)
    }
}

/// What backs the effective lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockSource {
    /// Lock switch reading.
    Sensor,
    /// Software-tracked state.
    Virtual,
    /// Neither is known.
    Unknown,
}

/// Best-available lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveLock {
    /// Fused value.
    pub locked: Option<bool>,
    /// Where it came from.
    pub source: LockSource,
}

impl EffectiveLock {
    /// Sensor reading when known, virtual state otherwise.
    pub fn fuse(sensor: Option<bool>, virtual_locked: Option<bool>) -> Self {
        match (sensor, virtual_locked) {
            (Some(locked), _) => Self {
                locked: Some(locked),
                source: LockSource::Sensor,
            },
            (None, Some(locked)) => Self {
                locked: Some(locked),
                source: LockSource::Virtual,
            },
            (None, None) => Self {
                locked: None,
                source: LockSource::Unknown,
            },
        }
    }

    /// Whether the fused value is known.
    #[inline]
    pub fn known(&self) -> bool {
        self.locked.is_some()
    }
}

/// Auto-lock part of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLockStatus {
    /// Configured idle period [s].
    pub seconds: f64,
    /// `seconds > 0`.
    pub enabled: bool,
    /// Time since the last unlock, `null` before the first one.
    pub seconds_since_last_unlock: Option<f64>,
}

/// Consistent point-in-time view of the lock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockSnapshot {
    /// Raw lock switch.
    pub lock_switch_on: Option<bool>,
    /// Raw door switch.
    pub door_switch_on: Option<bool>,
    /// Software-tracked state.
    pub virtual_locked: Option<bool>,
    /// Fused state.
    pub effective_locked: Option<bool>,
    /// `effective_locked` is known.
    pub lock_known: bool,
    /// Where `effective_locked` came from.
    pub lock_source: LockSource,
    /// Auto-lock status.
    pub auto_lock: AutoLockStatus,
}

impl LockSnapshot {
    /// Assemble a snapshot from sensor readings and a copy of the state.
    pub fn build(
        lock_switch_on: Option<bool>,
        door_switch_on: Option<bool>,
        state: &LockState,
        now: Duration,
    ) -> Self {
        let effective = EffectiveLock::fuse(lock_switch_on, state.virtual_locked);
        Self {
            lock_switch_on,
            door_switch_on,
            virtual_locked: state.virtual_locked,
            effective_locked: effective.locked,
            lock_known: effective.known(),
            lock_source: effective.source,
            auto_lock: AutoLockStatus {
                seconds: state.auto_lock_seconds,
                enabled: state.auto_lock_enabled(),
                seconds_since_last_unlock: state.seconds_since_unlock(now),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TRISTATE: [Option<bool>; 3] = [Some(true), Some(false), None];

    #[test]
    fn test_fusion_all_combinations() {
        for sensor in TRISTATE {
            for virtual_locked in TRISTATE {
                let fused = EffectiveLock::fuse(sensor, virtual_locked);
                let expected = sensor.or(virtual_locked);
                assert_eq!(fused.locked, expected, "sensor={sensor:?} virtual={virtual_locked:?}");
                assert_eq!(fused.known(), expected.is_some());
                let source = match (sensor, virtual_locked) {
                    (Some(_), _) => LockSource::Sensor,
                    (None, Some(_)) => LockSource::Virtual,
                    (None, None) => LockSource::Unknown,
                };
                assert_eq!(fused.source, source);
            }
        }
    }

    #[test]
    fn test_seconds_since_unlock_clamped() {
        let mut state = LockState::new(None, 5.0);
        assert_eq!(state.seconds_since_unlock(Duration::from_secs(3)), None);

        state.last_unlock = Some(Duration::from_secs(10));
        assert_eq!(state.seconds_since_unlock(Duration::from_secs(12)), Some(2.0));
        // A timestamp in the future never yields a negative age.
        assert_eq!(state.seconds_since_unlock(Duration::from_secs(8)), Some(0.0));
    }

    #[test]
    fn test_auto_lock_due() {
        let mut state = LockState::new(Some(false), 5.0);
        assert!(!state.auto_lock_due(Duration::from_secs(100)));

        state.last_unlock = Some(Duration::from_secs(10));
        assert!(!state.auto_lock_due(Duration::from_millis(14_999)));
        assert!(state.auto_lock_due(Duration::from_secs(15)));

        state.auto_lock_seconds = 0.0;
        assert!(!state.auto_lock_due(Duration::from_secs(1000)));
    }

    #[test]
    fn test_snapshot_build() {
        let state = LockState {
            virtual_locked: Some(false),
            auto_lock_seconds: 30.0,
            last_unlock: Some(Duration::from_secs(1)),
        };
        let snap = LockSnapshot::build(None, Some(true), &state, Duration::from_secs(4));
        assert_eq!(snap.effective_locked, Some(false));
        assert_eq!(snap.lock_source, LockSource::Virtual);
        assert!(snap.lock_known);
        assert!(snap.auto_lock.enabled);
        assert_eq!(snap.auto_lock.seconds_since_last_unlock, Some(3.0));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let state = LockState::new(None, 0.0);
        let snap = LockSnapshot::build(None, None, &state, Duration::ZERO);
        let json = serde_json::to_value(snap).unwrap();
        assert_eq!(json["lockSource"], "unknown");
        assert_eq!(json["lockKnown"], false);
        assert!(json["effectiveLocked"].is_null());
        assert_eq!(json["autoLock"]["enabled"], false);
        assert!(json["autoLock"]["secondsSinceLastUnlock"].is_null());
    }

    proptest! {
        #[test]
        fn clamp_never_negative(seconds in proptest::num::f64::ANY) {
            let clamped = clamp_auto_lock_seconds(seconds);
            prop_assert!(clamped >= 0.0);
            prop_assert!(clamped.is_finite());
        }

        #[test]
        fn clamp_keeps_positive(seconds in 0.001f64..1.0e6) {
            prop_assert_eq!(clamp_auto_lock_seconds(seconds), seconds);
        }
    }
}
