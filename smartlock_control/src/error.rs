//! Coordinator error types.

use smartlock_common::hal::driver::HalError;
use thiserror::Error;

/// Why a lock operation was refused or failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The door switch reports the door open. Nothing was actuated.
    #[error("door is open; refusing to lock")]
    DoorOpen,

    /// The actuator failed mid-movement. Lock state was left untouched.
    #[error("actuator failure: {0}")]
    Actuator(#[from] HalError),
}

impl LockError {
    /// Stable machine-readable code for clients.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DoorOpen => "door_open",
            Self::Actuator(_) => "actuator_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(LockError::DoorOpen.code(), "door_open");
        let err = LockError::from(HalError::ActuationFailed("stall".to_string()));
        assert_eq!(err.code(), "actuator_error");
        assert!(err.to_string().contains("stall"));
    }
}
