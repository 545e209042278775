use doorlock_hardware::HardwareError;
use thiserror::Error;

/// Storage-specific error types for the guard node's credential store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying memory device failed
    #[error("Memory error: {0}")]
    Hardware(#[from] HardwareError),

    /// The credential region does not hold a valid credential
    #[error("Corrupt credential at 0x{address:04X}: {message}")]
    Corrupt { address: u16, message: String },

    /// EEPROM image file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store or image set up with inconsistent parameters
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
