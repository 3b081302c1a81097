//! Test doubles shared by the coordinator integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use smartlock_common::hal::driver::{Actuator, HalError, LockAction, SensorSource};
use smartlock_control::{Clock, CoordinatorConfig, LockCoordinator, ManualClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// ── Sensors ─────────────────────────────────────────────────────────

const UNKNOWN: u8 = 0;
const OFF: u8 = 1;
const ON: u8 = 2;

fn encode(value: Option<bool>) -> u8 {
    match value {
        None => UNKNOWN,
        Some(false) => OFF,
        Some(true) => ON,
    }
}

fn decode(raw: u8) -> Option<bool> {
    match raw {
        OFF => Some(false),
        ON => Some(true),
        _ => None,
    }
}

/// Reed switches whose readings are set by the test.
#[derive(Default)]
pub struct MockSensors {
    lock: AtomicU8,
    door: AtomicU8,
    panic_on_read: AtomicBool,
    lock_reads: AtomicUsize,
}

impl MockSensors {
    pub fn new(lock: Option<bool>, door: Option<bool>) -> Arc<Self> {
        Arc::new(Self {
            lock: AtomicU8::new(encode(lock)),
            door: AtomicU8::new(encode(door)),
            ..Self::default()
        })
    }

    pub fn set_lock(&self, value: Option<bool>) {
        self.lock.store(encode(value), Ordering::SeqCst);
    }

    pub fn set_door(&self, value: Option<bool>) {
        self.door.store(encode(value), Ordering::SeqCst);
    }

    /// Make every lock switch read panic until cleared.
    pub fn set_panic(&self, on: bool) {
        self.panic_on_read.store(on, Ordering::SeqCst);
    }

    pub fn lock_reads(&self) -> usize {
        self.lock_reads.load(Ordering::SeqCst)
    }
}

impl SensorSource for MockSensors {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn lock_switch_on(&self) -> Option<bool> {
        self.lock_reads.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_read.load(Ordering::SeqCst) {
            panic!("lock switch read exploded");
        }
        decode(self.lock.load(Ordering::SeqCst))
    }

    fn door_switch_on(&self) -> Option<bool> {
        decode(self.door.load(Ordering::SeqCst))
    }
}

// ── Actuator ────────────────────────────────────────────────────────

/// One recorded actuation.
#[derive(Debug, Clone, Copy)]
pub struct Invocation {
    pub action: LockAction,
    pub start: Instant,
    pub end: Instant,
}

/// Actuator that records calls, optionally sleeps and optionally moves a
/// `MockSensors` lock switch to the commanded state.
#[derive(Default)]
pub struct MockActuator {
    delay: Duration,
    fail: AtomicBool,
    linked: Mutex<Option<Arc<MockSensors>>>,
    invocations: Mutex<Vec<Invocation>>,
    active: AtomicUsize,
    overlapped: AtomicBool,
}

impl MockActuator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    /// Move `sensors`' lock switch on every successful actuation.
    pub fn link(&self, sensors: Arc<MockSensors>) {
        *self.linked.lock() = Some(sensors);
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.invocations.lock().len()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    pub fn actions(&self) -> Vec<LockAction> {
        self.invocations.lock().iter().map(|i| i.action).collect()
    }

    /// A sweep is running right now.
    pub fn in_flight(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    /// Two actuations were ever in flight at once.
    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

impl Actuator for MockActuator {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn actuate(&self, action: LockAction) -> Result<LockAction, HalError> {
        if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        let start = Instant::now();
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let end = Instant::now();
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.invocations.lock().push(Invocation { action, start, end });

        if self.fail.load(Ordering::SeqCst) {
            return Err(HalError::ActuationFailed("servo stalled".to_string()));
        }
        if let Some(sensors) = self.linked.lock().as_ref() {
            sensors.set_lock(Some(action.target_locked()));
        }
        Ok(action)
    }
}

// ── Assembly ────────────────────────────────────────────────────────

pub struct Rig {
    pub coordinator: Arc<LockCoordinator>,
    pub actuator: Arc<MockActuator>,
    pub sensors: Arc<MockSensors>,
    pub clock: Arc<ManualClock>,
}

pub const T0: Duration = Duration::from_secs(1_000);

pub fn rig(
    actuator: Arc<MockActuator>,
    sensors: Arc<MockSensors>,
    config: CoordinatorConfig,
) -> Rig {
    let clock = Arc::new(ManualClock::new(T0));
    let coordinator = Arc::new(LockCoordinator::new(
        actuator.clone(),
        sensors.clone(),
        clock.clone() as Arc<dyn Clock>,
        config,
    ));
    Rig {
        coordinator,
        actuator,
        sensors,
        clock,
    }
}

pub fn simple_rig(lock: Option<bool>, door: Option<bool>) -> Rig {
    rig(
        MockActuator::new(),
        MockSensors::new(lock, door),
        CoordinatorConfig::default(),
    )
}
