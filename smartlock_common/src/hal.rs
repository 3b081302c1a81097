//! Hardware abstraction layer types.
//!
//! This module contains the driver traits, hardware configuration types and
//! defaults shared by the HAL drivers and the lock coordinator.

pub mod config;
pub mod consts;
pub mod driver;
