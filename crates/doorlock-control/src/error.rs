use doorlock_hardware::HardwareError;
use doorlock_storage::StorageError;
use thiserror::Error;

/// Faults that stop a node controller.
///
/// Domain outcomes (a wrong password, a lockout) are not errors; they are
/// reported through return values.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Serial link or wire-format error
    #[error("Protocol error: {0}")]
    Protocol(#[from] doorlock_core::Error),

    /// Peripheral failure
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Credential store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ControlError {
    /// Whether the peer hung up, as opposed to a local fault.
    pub fn is_link_closed(&self) -> bool {
        matches!(self, ControlError::Protocol(doorlock_core::Error::LinkClosed))
    }
}

/// Result type for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;
