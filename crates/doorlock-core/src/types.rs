use crate::{
    Result,
    constants::{
        ALARM_COMMAND_BYTE, CHANGE_PASSWORD_COMMAND_BYTE, CREDENTIAL_TERMINATOR,
        MATCHING_PASSWORD_BYTE, MAX_STRING_LENGTH, NO_COMMAND_BYTE, OPEN_DOOR_COMMAND_BYTE,
        PASSWORD_LENGTH, RECEIVER_READY_BYTE, SENDER_READY_BYTE, UNMATCHING_PASSWORD_BYTE,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-digit access code, stored as ASCII digits.
///
/// # Security
/// `Debug` and `Display` never print the digits, so a credential can be
/// passed to `tracing` fields without leaking it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Credential([u8; PASSWORD_LENGTH]);

impl Credential {
    /// Create a credential from ASCII digit bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` unless `ascii` holds exactly
    /// [`PASSWORD_LENGTH`] bytes in `b'0'..=b'9'`.
    pub fn new(ascii: &[u8]) -> Result<Self> {
        let digits: [u8; PASSWORD_LENGTH] = ascii.try_into().map_err(|_| {
            Error::InvalidCredential(format!(
                "expected {PASSWORD_LENGTH} digits, got {}",
                ascii.len()
            ))
        })?;

        if let Some(position) = digits.iter().position(|b| !b.is_ascii_digit()) {
            return Err(Error::InvalidCredential(format!(
                "non-digit byte 0x{:02X} at position {position}",
                digits[position]
            )));
        }

        Ok(Credential(digits))
    }

    /// Create a credential from numeric key values (0-9).
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` on a wrong length or a value above 9.
    pub fn from_digits(values: &[u8]) -> Result<Self> {
        if let Some(value) = values.iter().find(|v| **v > 9) {
            return Err(Error::InvalidCredential(format!(
                "digit must be 0-9, got {value}"
            )));
        }
        let ascii: Vec<u8> = values.iter().map(|v| b'0' + v).collect();
        Credential::new(&ascii)
    }

    /// Decode a credential received on the serial link.
    ///
    /// Accepts the bare digits or the digits followed by
    /// [`CREDENTIAL_TERMINATOR`].
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` if the payload is not a valid credential.
    pub fn from_wire(payload: &[u8]) -> Result<Self> {
        match payload.split_last() {
            Some((&CREDENTIAL_TERMINATOR, digits)) => Credential::new(digits),
            _ => Credential::new(payload),
        }
    }

    /// Encode for transmission: digits followed by the terminator.
    #[must_use]
    pub fn to_wire(&self) -> [u8; MAX_STRING_LENGTH] {
        let mut wire = [CREDENTIAL_TERMINATOR; MAX_STRING_LENGTH];
        wire[..PASSWORD_LENGTH].copy_from_slice(&self.0);
        wire
    }

    /// Get the ASCII digits.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PASSWORD_LENGTH] {
        &self.0
    }

    /// Index of the first position where the two credentials differ.
    ///
    /// Scanning stops at the first difference.
    #[must_use]
    pub fn first_mismatch(&self, other: &Credential) -> Option<usize> {
        self.0.iter().zip(other.0.iter()).position(|(a, b)| a != b)
    }

    /// Compare two credentials position by position.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_core::{Credential, PasswordStatus};
    ///
    /// let stored: Credential = "12345".parse().unwrap();
    /// let entered: Credential = "12345".parse().unwrap();
    /// assert_eq!(entered.compare(&stored), PasswordStatus::Matching);
    ///
    /// let wrong: Credential = "12355".parse().unwrap();
    /// assert_eq!(wrong.compare(&stored), PasswordStatus::Unmatching);
    /// ```
    #[must_use]
    pub fn compare(&self, other: &Credential) -> PasswordStatus {
        match self.first_mismatch(other) {
            Some(_) => PasswordStatus::Unmatching,
            None => PasswordStatus::Matching,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"*****").finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*****")
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Credential::new(s.as_bytes())
    }
}

/// Outcome of comparing two credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PasswordStatus {
    Matching = MATCHING_PASSWORD_BYTE,
    Unmatching = UNMATCHING_PASSWORD_BYTE,
}

impl PasswordStatus {
    /// Decode a match-result byte.
    ///
    /// # Errors
    /// Returns `Error::UnknownWireByte` for anything but `0xFF` or `0x00`.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            MATCHING_PASSWORD_BYTE => Ok(PasswordStatus::Matching),
            UNMATCHING_PASSWORD_BYTE => Ok(PasswordStatus::Unmatching),
            byte => Err(Error::UnknownWireByte {
                context: "password status",
                byte,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub fn is_matching(self) -> bool {
        matches!(self, PasswordStatus::Matching)
    }
}

impl TryFrom<u8> for PasswordStatus {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        PasswordStatus::from_u8(value)
    }
}

impl fmt::Display for PasswordStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PasswordStatus::Matching => write!(f, "Matching"),
            PasswordStatus::Unmatching => write!(f, "Unmatching"),
        }
    }
}

/// Command sent from the interface node to the guard node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Command {
    /// Nothing to do (failed verification below the lockout threshold).
    None = NO_COMMAND_BYTE,
    OpenDoor = OPEN_DOOR_COMMAND_BYTE,
    ChangePassword = CHANGE_PASSWORD_COMMAND_BYTE,
    /// Lockout reached, or an alarm announced on the link.
    Alarm = ALARM_COMMAND_BYTE,
}

impl Command {
    /// Decode a command byte.
    ///
    /// # Errors
    /// Returns `Error::UnknownWireByte` if the byte is not in the command table.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            NO_COMMAND_BYTE => Ok(Command::None),
            OPEN_DOOR_COMMAND_BYTE => Ok(Command::OpenDoor),
            CHANGE_PASSWORD_COMMAND_BYTE => Ok(Command::ChangePassword),
            ALARM_COMMAND_BYTE => Ok(Command::Alarm),
            byte => Err(Error::UnknownWireByte {
                context: "command",
                byte,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Command::from_u8(value)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::None => write!(f, "None"),
            Command::OpenDoor => write!(f, "OpenDoor"),
            Command::ChangePassword => write!(f, "ChangePassword"),
            Command::Alarm => write!(f, "Alarm"),
        }
    }
}

/// Readiness token exchanged before every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandshakeToken {
    SenderReady = SENDER_READY_BYTE,
    ReceiverReady = RECEIVER_READY_BYTE,
}

impl HandshakeToken {
    /// Decode a handshake byte.
    ///
    /// # Errors
    /// Returns `Error::UnknownWireByte` for any other byte.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            SENDER_READY_BYTE => Ok(HandshakeToken::SenderReady),
            RECEIVER_READY_BYTE => Ok(HandshakeToken::ReceiverReady),
            byte => Err(Error::UnknownWireByte {
                context: "handshake",
                byte,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for HandshakeToken {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        HandshakeToken::from_u8(value)
    }
}

impl fmt::Display for HandshakeToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HandshakeToken::SenderReady => write!(f, "SenderReady"),
            HandshakeToken::ReceiverReady => write!(f, "ReceiverReady"),
        }
    }
}
