//! Peripheral trait definitions.
//!
//! These traits are the only way the node controllers touch the outside
//! world: keypad, character display, door motor, buzzer, sequencing timer and
//! non-volatile memory. Mock implementations live in [`crate::mock`], the
//! timer over `tokio::time` in [`crate::timer`].
//!
//! Async traits use native `async fn` (Edition 2024 RPITIT), so they are not
//! object-safe; use generic parameters.

#![allow(async_fn_in_trait)]

use crate::error::{HardwareError, Result};
use crate::types::{MotorDirection, TimerMode};
use std::sync::Arc;
use std::time::Duration;

/// A key pressed on the 4x4 calculator-style keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(u8),
    /// `+` key.
    Plus,
    /// `-` key.
    Minus,
    /// `*` key.
    Multiply,
    /// `/` key.
    Divide,
    /// `=` key.
    Equals,
    /// `ON/C` key.
    Clear,
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::traits::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input.as_digit(), Some(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {}",
                d
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a key legend to an input.
    ///
    /// # Errors
    ///
    /// Returns an error for characters that are not on the keypad.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::traits::KeypadInput;
    ///
    /// assert_eq!(KeypadInput::from_char('7').unwrap(), KeypadInput::Digit(7));
    /// assert_eq!(KeypadInput::from_char('=').unwrap(), KeypadInput::Equals);
    /// assert!(KeypadInput::from_char('x').is_err());
    /// ```
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            '0'..='9' => Ok(Self::Digit(c as u8 - b'0')),
            '+' => Ok(Self::Plus),
            '-' => Ok(Self::Minus),
            '*' => Ok(Self::Multiply),
            '/' => Ok(Self::Divide),
            '=' => Ok(Self::Equals),
            'c' | 'C' => Ok(Self::Clear),
            other => Err(HardwareError::invalid_data(format!(
                "No key for character {:?}",
                other
            ))),
        }
    }

    /// Key legend as printed on the keypad.
    pub fn as_char(&self) -> char {
        match self {
            Self::Digit(d) => char::from_digit(u32::from(*d), 10).unwrap_or('?'),
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::Equals => '=',
            Self::Clear => 'C',
        }
    }

    /// Check if this input is a digit.
    pub fn is_digit(&self) -> bool {
        matches!(self, Self::Digit(_))
    }

    /// Get the digit value if this is a digit input.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

/// Keypad device abstraction.
///
/// # Examples
///
/// ```no_run
/// use doorlock_hardware::traits::{KeypadDevice, KeypadInput};
/// use doorlock_hardware::Result;
///
/// async fn wait_for_enter<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
///     while keypad.read_input().await? != KeypadInput::Equals {}
///     Ok(())
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Wait for the next key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_input(&mut self) -> Result<KeypadInput>;
}

/// Character display (HD44780-style LCD).
pub trait DisplayDevice: Send + Sync {
    /// Write `text` starting at (`row`, `col`). Text past the end of the row
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error for a position outside the panel or non-ASCII text.
    async fn show(&mut self, text: &str, row: usize, col: usize) -> Result<()>;

    /// Blank the whole panel.
    async fn clear(&mut self) -> Result<()>;
}

/// Door motor (H-bridge driven DC motor).
pub trait MotorDevice: Send + Sync {
    async fn set_direction(&mut self, direction: MotorDirection) -> Result<()>;
}

/// Alarm buzzer.
pub trait BuzzerDevice: Send + Sync {
    async fn on(&mut self) -> Result<()>;
    async fn off(&mut self) -> Result<()>;
}

/// Callback invoked on every timer expiry.
///
/// The nodes register a handler whose only effect is advancing the tick
/// counter.
pub type TickHandler = Arc<dyn Fn() + Send + Sync>;

/// Periodic sequencing timer.
///
/// Expiries run the registered [`TickHandler`] concurrently with the caller.
/// All methods return immediately.
pub trait TimerDevice: Send {
    /// Register the expiry handler. Takes effect at the next `configure`.
    fn set_handler(&mut self, handler: TickHandler);

    /// Start the timer with the given period, restarting it if running.
    ///
    /// # Errors
    ///
    /// Returns an error if no handler is registered or the period is zero.
    fn configure(&mut self, period: Duration, mode: TimerMode) -> Result<()>;

    /// Change the period of a running timer without restarting it.
    ///
    /// The next expiry lands one new period after the most recent one.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer is not running or the period is zero.
    fn change_period(&mut self, period: Duration) -> Result<()>;

    /// Stop the timer. Idempotent.
    fn disable(&mut self);

    /// Currently configured period, `None` while disabled.
    fn period(&self) -> Option<Duration>;
}

/// Byte-addressable non-volatile memory (I2C EEPROM).
pub trait NonVolatileMemory: Send + Sync {
    /// Capacity in bytes.
    fn size(&self) -> usize;

    async fn read_byte(&mut self, address: u16) -> Result<u8>;

    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()>;

    /// Write a contiguous block.
    ///
    /// The default writes byte by byte; implementations that can commit the
    /// block in one operation should override it.
    async fn write_bytes(&mut self, address: u16, data: &[u8]) -> Result<()> {
        check_range(address, data.len(), self.size())?;
        for (offset, &value) in data.iter().enumerate() {
            self.write_byte(address + offset as u16, value).await?;
        }
        Ok(())
    }

    /// Read a contiguous block.
    async fn read_bytes(&mut self, address: u16, len: usize) -> Result<Vec<u8>> {
        check_range(address, len, self.size())?;
        let mut data = Vec::with_capacity(len);
        for offset in 0..len {
            data.push(self.read_byte(address + offset as u16).await?);
        }
        Ok(data)
    }
}

/// Fail unless `address..address + len` lies inside a memory of `size` bytes.
pub fn check_range(address: u16, len: usize, size: usize) -> Result<()> {
    if usize::from(address) + len > size {
        return Err(HardwareError::address_out_of_range(address, len, size));
    }
    Ok(())
}
