//! Interface side of the password exchange: keypad in, display out, link to
//! the guard.

use super::state::{AuthState, AuthStateMachine};
use crate::error::Result;
use crate::messages;
use crate::state::AttemptCounter;
use doorlock_core::constants::{MAX_WRONG_PASSWORDS, PASSWORD_LENGTH, PASSWORD_MASK_CHAR};
use doorlock_core::{Command, Credential, PasswordStatus};
use doorlock_hardware::{DisplayDevice, KeypadDevice, KeypadInput};
use doorlock_protocol::SerialLink;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace, warn};

/// Display row used for the masked echo of typed digits.
const ECHO_ROW: usize = 1;

/// Result of an interface `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The guard accepted the password.
    Verified,
    /// The attempt cap was exceeded; the caller runs the alarm.
    Locked,
}

/// Captures passwords on the keypad and has the guard check them.
#[derive(Debug)]
pub struct InterfaceAuth<S, K, D> {
    link: SerialLink<S>,
    keypad: K,
    display: D,
    attempts: Arc<AttemptCounter>,
    machine: AuthStateMachine,
    notice: Duration,
}

impl<S, K, D> InterfaceAuth<S, K, D>
where
    S: AsyncRead + AsyncWrite + Unpin,
    K: KeypadDevice,
    D: DisplayDevice,
{
    /// `notice` is how long a mismatch message stays on screen.
    pub fn new(
        link: SerialLink<S>,
        keypad: K,
        display: D,
        attempts: Arc<AttemptCounter>,
        notice: Duration,
    ) -> Self {
        Self {
            link,
            keypad,
            display,
            attempts,
            machine: AuthStateMachine::new(),
            notice,
        }
    }

    /// Show `prompt` and collect one password.
    ///
    /// Non-digit keys are ignored, digits past the fifth are dropped, and
    /// `=` only ends the capture once five digits are in. Each accepted digit
    /// is echoed as `*` on the second row; the display is cleared at the end.
    pub async fn capture(&mut self, prompt: &str) -> Result<Credential> {
        self.display.clear().await?;
        self.display.show(prompt, 0, 0).await?;

        let mask = PASSWORD_MASK_CHAR.to_string();
        let mut digits = Vec::with_capacity(PASSWORD_LENGTH);
        loop {
            match self.keypad.read_input().await? {
                KeypadInput::Digit(d) if digits.len() < PASSWORD_LENGTH => {
                    self.display.show(&mask, ECHO_ROW, digits.len()).await?;
                    digits.push(d);
                }
                KeypadInput::Equals if digits.len() == PASSWORD_LENGTH => break,
                key => trace!(key = %key.as_char(), collected = digits.len(), "Key ignored"),
            }
        }

        self.display.clear().await?;
        Ok(Credential::from_digits(&digits)?)
    }

    /// Transmit `credential` and return the guard's verdict.
    pub async fn exchange(&mut self, credential: &Credential) -> Result<PasswordStatus> {
        self.link.send_credential(credential).await?;
        Ok(self.link.receive_status().await?)
    }

    /// Set a new password: type it twice until the guard reports a match.
    ///
    /// No retry cap applies. Returns the number of rounds it took.
    pub async fn set_new(&mut self) -> Result<u32> {
        let mut rounds = 0;
        loop {
            rounds += 1;

            let primary = self.capture(messages::NEW_PASSWORD_PROMPT).await?;
            self.link.send_credential(&primary).await?;
            self.machine.transition_to(AuthState::CollectingConfirmation)?;

            let confirmation = self.capture(messages::REENTER_PASSWORD_PROMPT).await?;
            self.link.send_credential(&confirmation).await?;
            self.machine.transition_to(AuthState::Verifying)?;

            let status = self.link.receive_status().await?;
            self.machine.transition_to(AuthState::CollectingPrimary)?;

            if status.is_matching() {
                info!(rounds, "New password accepted");
                return Ok(rounds);
            }

            debug!(rounds, "Passwords did not match");
            self.notify_mismatch().await?;
        }
    }

    /// Verify the user against the guard's stored password.
    ///
    /// The attempt counter is incremented before each attempt; once it
    /// exceeds the cap, no password is captured and the result is `Locked`.
    /// A success resets the counter. The counter is left as is on lockout;
    /// the node clears it when the alarm has run.
    pub async fn verify(&mut self) -> Result<Verification> {
        loop {
            let attempt = self.attempts.increment();
            if attempt > MAX_WRONG_PASSWORDS {
                self.machine.transition_to(AuthState::Locked)?;
                warn!(attempt, "Too many wrong passwords");
                return Ok(Verification::Locked);
            }

            let credential = self.capture(messages::ENTER_PASSWORD_PROMPT).await?;
            self.machine.transition_to(AuthState::Verifying)?;
            let status = self.exchange(&credential).await?;
            self.machine.transition_to(AuthState::CollectingPrimary)?;

            if status.is_matching() {
                self.attempts.reset();
                debug!(attempt, "Password verified");
                return Ok(Verification::Verified);
            }

            debug!(attempt, "Wrong password");
            // The last allowed attempt goes straight to the lockout screen.
            if attempt != MAX_WRONG_PASSWORDS {
                self.notify_mismatch().await?;
            }
        }
    }

    /// Back to `CollectingPrimary` once the alarm has run.
    pub fn unlock(&mut self) -> Result<()> {
        if self.machine.is_locked() {
            self.machine.transition_to(AuthState::CollectingPrimary)?;
        }
        Ok(())
    }

    /// Send a command to the guard.
    pub async fn send_command(&mut self, command: Command) -> Result<()> {
        self.link.send_command(command).await?;
        Ok(())
    }

    async fn notify_mismatch(&mut self) -> Result<()> {
        self.display.clear().await?;
        self.display.show(messages::MISMATCH_TITLE, 0, 0).await?;
        self.display.show(messages::MISMATCH_HINT, 1, 0).await?;
        tokio::time::sleep(self.notice).await;
        self.display.clear().await?;
        Ok(())
    }

    pub fn state(&self) -> &AuthStateMachine {
        &self.machine
    }

    pub fn attempts(&self) -> &AttemptCounter {
        &self.attempts
    }

    pub fn keypad_mut(&mut self) -> &mut K {
        &mut self.keypad
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn into_parts(self) -> (SerialLink<S>, K, D) {
        (self.link, self.keypad, self.display)
    }
}
