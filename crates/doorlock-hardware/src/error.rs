//! Error types for peripheral operations.
//!
//! Covers the faults the nodes can observe from their collaborators: a
//! keypad or display that went away, bad data handed to a device, EEPROM
//! accesses outside the chip, and a timer used before it was configured.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Invalid data handed to or received from a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Display position outside the panel.
    #[error("Position ({row}, {col}) outside {rows}x{cols} display")]
    InvalidPosition {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Memory access beyond the end of the chip.
    #[error("Address range 0x{address:04X}+{len} exceeds memory size {size}")]
    AddressOutOfRange { address: u16, len: usize, size: usize },

    /// Device used before it was set up.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new out-of-range memory access error.
    pub fn address_out_of_range(address: u16, len: usize, size: usize) -> Self {
        Self::AddressOutOfRange { address, len, size }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("keypad");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: keypad");
    }

    #[test]
    fn test_address_out_of_range_error() {
        let error = HardwareError::address_out_of_range(0x07FE, 5, 2048);
        assert_eq!(
            error.to_string(),
            "Address range 0x07FE+5 exceeds memory size 2048"
        );
    }

    #[test]
    fn test_invalid_position_error() {
        let error = HardwareError::InvalidPosition {
            row: 2,
            col: 0,
            rows: 2,
            cols: 16,
        };
        assert_eq!(error.to_string(), "Position (2, 0) outside 2x16 display");
    }

    #[test]
    fn test_configuration_error() {
        let error = HardwareError::configuration("timer not configured");
        assert!(matches!(error, HardwareError::ConfigurationError { .. }));
        assert_eq!(
            error.to_string(),
            "Configuration error: timer not configured"
        );
    }
}
