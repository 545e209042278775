//! Mock keypad implementation for testing and simulation.

use crate::{
    HardwareError, Result,
    traits::{KeypadDevice, KeypadInput},
};
use tokio::sync::mpsc;

/// Capacity of the simulated key buffer.
const KEY_BUFFER_SIZE: usize = 128;

/// Mock keypad device.
///
/// Key presses are queued through a [`MockKeypadHandle`].
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockKeypad;
/// use doorlock_hardware::traits::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     handle.send_keys("1+=").await?;
///
///     assert_eq!(keypad.read_input().await?, KeypadInput::Digit(1));
///     assert_eq!(keypad.read_input().await?, KeypadInput::Plus);
///     assert_eq!(keypad.read_input().await?, KeypadInput::Equals);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    input_rx: mpsc::Receiver<KeypadInput>,
}

impl MockKeypad {
    /// Create a new mock keypad and the handle that feeds it.
    pub fn new() -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(KEY_BUFFER_SIZE);
        (Self { input_rx }, MockKeypadHandle { input_tx })
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        self.input_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Keypad input channel closed"))
    }
}

/// Handle for feeding a mock keypad. Cloneable and shareable across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    input_tx: mpsc::Sender<KeypadInput>,
}

impl MockKeypadHandle {
    /// Queue one key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.input_tx
            .send(input)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Queue a sequence of digit presses.
    ///
    /// # Errors
    ///
    /// Returns an error if a digit is greater than 9 or the keypad has been
    /// dropped.
    pub async fn send_digits(&self, digits: &[u8]) -> Result<()> {
        for &digit in digits {
            let input = KeypadInput::digit(digit)?;
            self.send_input(input).await?;
        }
        Ok(())
    }

    /// Type a password: its digits followed by `=`.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::mock::MockKeypad;
    ///
    /// #[tokio::main]
    /// async fn main() -> doorlock_hardware::Result<()> {
    ///     let (_keypad, handle) = MockKeypad::new();
    ///     handle.send_password("12345").await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn send_password(&self, password: &str) -> Result<()> {
        for c in password.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| HardwareError::invalid_data(format!("not a digit: {c:?}")))?;
            self.send_input(KeypadInput::Digit(digit as u8)).await?;
        }
        self.send_input(KeypadInput::Equals).await
    }

    /// Queue key presses by legend, e.g. `"+12345="`.
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        for c in keys.chars() {
            self.send_input(KeypadInput::from_char(c)?).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_keypad_basic_input() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_input(KeypadInput::Digit(5)).await.unwrap();

        let input = keypad.read_input().await.unwrap();
        assert_eq!(input, KeypadInput::Digit(5));
    }

    #[tokio::test]
    async fn test_mock_keypad_send_digits() {
        let (mut keypad, handle) = MockKeypad::new();

        tokio::spawn(async move {
            handle.send_digits(&[1, 2, 3, 4]).await.unwrap();
        });

        for expected in [1, 2, 3, 4] {
            let input = keypad.read_input().await.unwrap();
            assert_eq!(input, KeypadInput::Digit(expected));
        }
    }

    #[tokio::test]
    async fn test_mock_keypad_send_password() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_password("98765").await.unwrap();

        for expected in [9, 8, 7, 6, 5] {
            assert_eq!(
                keypad.read_input().await.unwrap(),
                KeypadInput::Digit(expected)
            );
        }
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Equals);
    }

    #[tokio::test]
    async fn test_mock_keypad_send_password_rejects_letters() {
        let (_keypad, handle) = MockKeypad::new();
        assert!(handle.send_password("12a45").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_keypad_send_keys() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_keys("-7*C").await.unwrap();

        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Minus);
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Digit(7));
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Multiply);
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Clear);
    }

    #[tokio::test]
    async fn test_mock_keypad_handle_clone() {
        let (mut keypad, handle) = MockKeypad::new();
        let handle_clone = handle.clone();

        handle.send_input(KeypadInput::Digit(1)).await.unwrap();
        handle_clone.send_input(KeypadInput::Digit(2)).await.unwrap();

        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Digit(1));
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Digit(2));
    }

    #[tokio::test]
    async fn test_mock_keypad_closed_channel() {
        let (mut keypad, handle) = MockKeypad::new();

        drop(handle);

        let result = keypad.read_input().await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }
}
