//! # SmartLock Control Library
//!
//! The lock state coordinator. It owns the only mutable lock state in the
//! process and is shared between HTTP handlers and the auto-lock loop.
//!
//! ## Responsibilities
//!
//! 1. **Fusion**: combine optional reed switch readings with the virtual
//!    (software-tracked) lock state into one effective state
//! 2. **Serialized actuation**: one servo sweep at a time across all callers
//! 3. **Confirm-wait**: optionally block until the lock switch agrees
//! 4. **Auto-lock**: re-lock after an idle period once the door is closed
//! 5. **Snapshots**: self-consistent status reads that never wait on the servo
//!
//! ## Locking
//!
//! Two mutexes: the actuation lock (held for a whole sweep) and the state
//! lock (held only to copy or update `LockState`). They are always taken in
//! that order. Sensor reads and actuation never happen under the state lock.

pub mod autolock;
pub mod clock;
pub mod confirm;
pub mod coordinator;
pub mod error;
pub mod state;

pub use autolock::{AutoLockMonitor, AutoLockTask, LoopStats, TickOutcome};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use confirm::{ConfirmPolicy, ConfirmSource, Confirmation};
pub use coordinator::{ActionResult, CoordinatorConfig, LockCoordinator};
pub use error::LockError;
pub use state::{
    AutoLockStatus, EffectiveLock, LockSnapshot, LockSource, LockState, clamp_auto_lock_seconds,
};
