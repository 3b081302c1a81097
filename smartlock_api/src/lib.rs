//! # SmartLock HTTP API
//!
//! JSON control surface over a shared [`LockCoordinator`]:
//!
//! | Route | Method | Result |
//! |-------|--------|--------|
//! | `/api/status` | GET | snapshot + servo settings |
//! | `/api/lock` | POST | lock, 409 when the door is open |
//! | `/api/unlock` | POST | unlock |
//! | `/api/toggle` | POST | lock or unlock from the effective state |
//! | `/api/autolock` | POST | set the auto-lock period |
//! | `/` | GET | embedded control page |
//!
//! Lock operations block for a full servo sweep and run on the blocking pool.
//!
//! [`LockCoordinator`]: smartlock_control::LockCoordinator

#![deny(missing_docs)]

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, ServoEcho, router, serve};
