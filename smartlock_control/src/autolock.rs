//! Auto-lock policy and its background thread.
//!
//! [`AutoLockMonitor`] holds the per-loop state (the previous lock switch
//! reading) and evaluates one tick. [`AutoLockTask`] runs the monitor on a
//! dedicated thread until stopped. A tick that errors or panics is logged
//! and the loop carries on.

use crate::coordinator::LockCoordinator;
use crate::error::LockError;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do.
    Idle,
    /// The lock operation ran and succeeded.
    Fired,
}

/// Auto-lock policy state.
pub struct AutoLockMonitor {
    coordinator: Arc<LockCoordinator>,
    prev_locked: Option<bool>,
}

impl AutoLockMonitor {
    /// Create a monitor. The first tick's reading becomes the baseline for
    /// edge detection.
    pub fn new(coordinator: Arc<LockCoordinator>) -> Self {
        Self {
            coordinator,
            prev_locked: None,
        }
    }

    /// Evaluate the policy once.
    ///
    /// Mirrors a known lock switch reading into the virtual state and
    /// restarts the timer on a locked → unlocked transition. Locks when
    /// auto-lock is enabled, the bolt reads retracted, the door reads closed
    /// and the idle period since the last unlock has elapsed. The coordinator
    /// re-checks these under its actuation lock, so a concurrent unlock
    /// cancels the attempt. After firing the timer restarts whatever the
    /// outcome.
    ///
    /// # Errors
    /// Forwards the lock operation's error.
    pub fn tick(&mut self) -> Result<TickOutcome, LockError> {
        let coordinator = &self.coordinator;
        let lock_reading = coordinator.sensors().is_locked();
        let door_closed = coordinator.sensors().is_door_closed();
        let now = coordinator.clock().now();

        let unlocked_edge = self.prev_locked == Some(true) && lock_reading == Some(false);
        if unlocked_edge {
            debug!("Lock switch went locked -> unlocked, restarting auto-lock timer");
        }
        if lock_reading.is_some() {
            self.prev_locked = lock_reading;
        }

        let state = coordinator.observe_lock_switch(lock_reading, unlocked_edge, now);
        if lock_reading != Some(false) || door_closed != Some(true) || !state.auto_lock_due(now) {
            return Ok(TickOutcome::Idle);
        }

        info!(
            "Auto-lock: idle for {:.1}s (limit {}s), locking",
            state.seconds_since_unlock(now).unwrap_or_default(),
            state.auto_lock_seconds
        );
        match coordinator.lock_if_auto_lock_due()? {
            Some(_) => Ok(TickOutcome::Fired),
            None => {
                info!("Auto-lock cancelled: state changed while waiting for actuation");
                Ok(TickOutcome::Idle)
            }
        }
    }
}

/// Loop counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks evaluated.
    pub ticks: u64,
    /// Successful auto-locks.
    pub fired: u64,
    /// Ticks that returned an error.
    pub errors: u64,
    /// Ticks that panicked.
    pub panics: u64,
}

/// Log a debug summary every this many ticks.
const STATS_LOG_INTERVAL: u64 = 120;

/// Handle to the auto-lock thread.
pub struct AutoLockTask {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<LoopStats>>,
}

impl AutoLockTask {
    /// Start the loop, evaluating the policy every `interval`.
    ///
    /// # Errors
    /// Fails if the thread cannot be spawned.
    pub fn spawn(coordinator: Arc<LockCoordinator>, interval: Duration) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let monitor = AutoLockMonitor::new(coordinator);

        let handle = thread::Builder::new()
            .name("auto-lock".to_string())
            .spawn(move || run_loop(monitor, &flag, interval))?;

        info!("Auto-lock loop started (interval={:?})", interval);
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Whether the loop thread is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop and wait for the thread. Returns the final counters,
    /// or `None` if already stopped.
    pub fn stop(&mut self) -> Option<LoopStats> {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.handle.take()?;
        handle.thread().unpark();
        match handle.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                error!("Auto-lock thread terminated abnormally");
                None
            }
        }
    }
}

impl Drop for AutoLockTask {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(mut monitor: AutoLockMonitor, running: &AtomicBool, interval: Duration) -> LoopStats {
    let mut stats = LoopStats::default();

    while running.load(Ordering::SeqCst) {
        match panic::catch_unwind(AssertUnwindSafe(|| monitor.tick())) {
            Ok(Ok(TickOutcome::Idle)) => {}
            Ok(Ok(TickOutcome::Fired)) => stats.fired += 1,
            Ok(Err(e)) => {
                stats.errors += 1;
                warn!("Auto-lock attempt failed: {}", e);
            }
            Err(payload) => {
                stats.panics += 1;
                error!("Auto-lock tick panicked: {}", panic_message(payload.as_ref()));
            }
        }
        stats.ticks += 1;

        if stats.ticks % STATS_LOG_INTERVAL == 0 {
            debug!(
                "Auto-lock loop: {} ticks, fired={}, errors={}, panics={}",
                stats.ticks, stats.fired, stats.errors, stats.panics
            );
        }

        // Unparked early by stop().
        thread::park_timeout(interval);
    }

    info!(
        "Auto-lock loop stopped after {} ticks (fired={}, errors={}, panics={})",
        stats.ticks, stats.fired, stats.errors, stats.panics
    );
    stats
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic>"
    }
}
