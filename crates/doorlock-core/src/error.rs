use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    // Protocol errors
    #[error("Unknown {context} byte: 0x{byte:02X}")]
    UnknownWireByte { context: &'static str, byte: u8 },

    #[error("Serial link closed by peer")]
    LinkClosed,

    #[error("Handshake timeout after {duration_ms}ms")]
    HandshakeTimeout { duration_ms: u64 },

    #[error("String exceeds {max} bytes without terminator")]
    UnterminatedString { max: usize },

    // State errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
