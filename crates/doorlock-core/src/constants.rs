//! Core constants for the doorlock serial protocol and device behavior.
//!
//! This module defines the wire-level byte values exchanged between the
//! interface node (keypad + display) and the guard node (password store +
//! door motor + buzzer), together with the timing and storage constants both
//! nodes agree on.
//!
//! # Protocol Structure
//!
//! Every application-level transfer is preceded by a readiness handshake:
//!
//! ```text
//! sender                          receiver
//!   │ ── SENDER_READY_BYTE ──────────► │
//!   │ ◄────────── RECEIVER_READY_BYTE ─ │
//!   │ ── payload ────────────────────► │
//! ```
//!
//! A payload is either a single byte (command or match result) or a
//! credential: [`PASSWORD_LENGTH`] ASCII digits followed by
//! [`CREDENTIAL_TERMINATOR`].
//!
//! # Wire Table
//!
//! | Constant | Value | Direction |
//! |----------|-------|-----------|
//! | [`SENDER_READY_BYTE`] | `0x01` | both |
//! | [`RECEIVER_READY_BYTE`] | `0x02` | both |
//! | [`MATCHING_PASSWORD_BYTE`] | `0xFF` | guard → interface |
//! | [`UNMATCHING_PASSWORD_BYTE`] | `0x00` | guard → interface |
//! | [`OPEN_DOOR_COMMAND_BYTE`] | `0x10` | interface → guard |
//! | [`CHANGE_PASSWORD_COMMAND_BYTE`] | `0x11` | interface → guard |
//! | [`ALARM_COMMAND_BYTE`] | `0x12` | interface → guard, guard self-signal |
//!
//! # Usage
//!
//! ```
//! use doorlock_core::constants::*;
//!
//! assert_eq!(PASSWORD_LENGTH, 5);
//! assert_eq!(MAX_STRING_LENGTH, PASSWORD_LENGTH + 1);
//! assert_ne!(SENDER_READY_BYTE, RECEIVER_READY_BYTE);
//! ```
//!
//! Modifying the wire values breaks interoperability between nodes built
//! from different versions.

// ============================================================================
// Handshake Tokens
// ============================================================================

/// Sent by the side that is about to transmit a payload.
pub const SENDER_READY_BYTE: u8 = 0x01;

/// Sent by the side that is ready to accept a payload.
pub const RECEIVER_READY_BYTE: u8 = 0x02;

// ============================================================================
// Match Results
// ============================================================================

/// Guard → interface: the compared credentials matched.
pub const MATCHING_PASSWORD_BYTE: u8 = 0xFF;

/// Guard → interface: the compared credentials did not match.
pub const UNMATCHING_PASSWORD_BYTE: u8 = 0x00;

// ============================================================================
// Commands
// ============================================================================

/// No command. Never transmitted by the interface node.
pub const NO_COMMAND_BYTE: u8 = 0x00;

/// Interface → guard: run the door sequence.
pub const OPEN_DOOR_COMMAND_BYTE: u8 = 0x10;

/// Interface → guard: run the change-password flow.
pub const CHANGE_PASSWORD_COMMAND_BYTE: u8 = 0x11;

/// Alarm command.
///
/// Also accepted by the guard in place of [`SENDER_READY_BYTE`] while it
/// waits for a password to verify.
pub const ALARM_COMMAND_BYTE: u8 = 0x12;

// ============================================================================
// Credentials
// ============================================================================

/// Exact number of digits in a credential.
pub const PASSWORD_LENGTH: usize = 5;

/// Marks the end of a credential string on the wire (`#`).
pub const CREDENTIAL_TERMINATOR: u8 = b'#';

/// Maximum number of bytes in a transmitted string (digits + terminator).
pub const MAX_STRING_LENGTH: usize = PASSWORD_LENGTH + 1;

/// Consecutive wrong passwords allowed before the alarm triggers.
pub const MAX_WRONG_PASSWORDS: u8 = 3;

/// Character echoed on the display for each captured digit.
pub const PASSWORD_MASK_CHAR: char = '*';

// ============================================================================
// Keypad Layout
// ============================================================================

/// Key that submits a captured password.
pub const ENTER_KEY: char = '=';

/// Main menu key selecting the door-open flow.
pub const OPEN_DOOR_KEY: char = '+';

/// Main menu key selecting the change-password flow.
pub const CHANGE_PASSWORD_KEY: char = '-';

// ============================================================================
// Non-volatile Storage
// ============================================================================

/// Start address of the stored credential in the guard's EEPROM.
pub const PASSWORD_BASE_ADDRESS: u16 = 0x0200;

/// Capacity of the guard's EEPROM in bytes (24C16, 16 Kbit).
pub const EEPROM_SIZE: usize = 2048;

/// Value of an erased EEPROM cell.
pub const EEPROM_ERASED_BYTE: u8 = 0xFF;

// ============================================================================
// Timer
// ============================================================================

/// CPU clock feeding the sequencing timer, in hertz.
pub const DEFAULT_CPU_FREQUENCY_HZ: u32 = 8_000_000;

/// Prescaler between the CPU clock and the timer counter.
pub const DEFAULT_TIMER_PRESCALER: u32 = 1024;

/// Compare value producing one tick every ~7.5 seconds.
pub const TIMER_COMPARE_VALUE_LONG: u16 = 58594;

/// Compare value producing one tick every ~3 seconds.
pub const TIMER_COMPARE_VALUE_SHORT: u16 = 23438;

// ============================================================================
// Sequence Thresholds
// ============================================================================

/// Tick count at which the door has finished opening (2 long ticks, ~15 s).
pub const DOOR_OPENED_TICKS: u32 = 2;

/// Tick count at which the door starts closing (1 short tick, ~3 s).
pub const DOOR_HOLD_TICKS: u32 = 3;

/// Tick count at which the door has finished closing (2 long ticks, ~15 s).
pub const DOOR_CLOSED_TICKS: u32 = 5;

/// Tick count at which the alarm stops (8 long ticks, ~1 minute).
pub const ALARM_TICKS: u32 = 8;

// ============================================================================
// Interface Timing
// ============================================================================

/// How long notices (mismatch, password changed) stay on screen.
pub const DEFAULT_NOTICE_MS: u64 = 1000;
