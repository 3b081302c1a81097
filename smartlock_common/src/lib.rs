//! SmartLock Common Library
//!
//! This crate provides shared types, configuration loading and the hardware
//! driver traits used by all SmartLock workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and the service configuration
//! - [`hal`] - Driver traits (`Actuator`, `SensorSource`), hardware config, constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use smartlock_common::prelude::*;
//! ```

pub mod config;
pub mod hal;
pub mod prelude;
