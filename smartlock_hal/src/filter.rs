//! Glitch filter for reed switch readings.
//!
//! Reed switches chatter when a magnet passes slowly. The filter only reports
//! a changed reading once it has been observed unchanged for the configured
//! window; until then the previous stable reading is reported. Stability is
//! measured across polls, so the window should be a few poll intervals long.

use parking_lot::Mutex;
use smartlock_common::hal::driver::SensorSource;
use std::time::{Duration, Instant};

/// Debounce state of one input.
#[derive(Debug, Clone, Copy)]
struct Channel {
    primed: bool,
    stable: Option<bool>,
    candidate: Option<bool>,
    since: Instant,
}

impl Channel {
    fn new(now: Instant) -> Self {
        Self {
            primed: false,
            stable: None,
            candidate: None,
            since: now,
        }
    }

    fn update(&mut self, raw: Option<bool>, now: Instant, window: Duration) -> Option<bool> {
        if !self.primed {
            self.primed = true;
            self.stable = raw;
            self.candidate = raw;
            self.since = now;
            return raw;
        }
        if raw == self.stable {
            self.candidate = raw;
            return self.stable;
        }
        if raw != self.candidate {
            self.candidate = raw;
            self.since = now;
        }
        if now.duration_since(self.since) >= window {
            self.stable = raw;
        }
        self.stable
    }
}

#[derive(Debug)]
struct FilterState {
    lock: Channel,
    door: Channel,
}

/// `SensorSource` decorator suppressing short-lived changes.
pub struct GlitchFilter<S: SensorSource> {
    inner: S,
    window: Duration,
    state: Mutex<FilterState>,
}

impl<S: SensorSource> GlitchFilter<S> {
    /// Wrap `inner`; readings must be stable for `window` before being reported.
    pub fn new(inner: S, window: Duration) -> Self {
        let now = Instant::now();
        Self {
            inner,
            window,
            state: Mutex::new(FilterState {
                lock: Channel::new(now),
                door: Channel::new(now),
            }),
        }
    }
}

impl<S: SensorSource> SensorSource for GlitchFilter<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn lock_switch_on(&self) -> Option<bool> {
        let raw = self.inner.lock_switch_on();
        self.state.lock().lock.update(raw, Instant::now(), self.window)
    }

    fn door_switch_on(&self) -> Option<bool> {
        let raw = self.inner.door_switch_on();
        self.state.lock().door.update(raw, Instant::now(), self.window)
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }
}
