//! Guard side of the password exchange: link from the interface, credential
//! store for the reference password.

use super::state::{AuthState, AuthStateMachine};
use crate::error::Result;
use crate::state::AttemptCounter;
use doorlock_core::constants::MAX_WRONG_PASSWORDS;
use doorlock_core::{Command, Credential, Error, PasswordStatus};
use doorlock_hardware::NonVolatileMemory;
use doorlock_protocol::{Incoming, SerialLink};
use doorlock_storage::CredentialStore;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Checks passwords sent by the interface against the stored one.
#[derive(Debug)]
pub struct GuardAuth<S, M> {
    link: SerialLink<S>,
    store: CredentialStore<M>,
    attempts: Arc<AttemptCounter>,
    machine: AuthStateMachine,
}

impl<S, M> GuardAuth<S, M>
where
    S: AsyncRead + AsyncWrite + Unpin,
    M: NonVolatileMemory,
{
    pub fn new(link: SerialLink<S>, store: CredentialStore<M>, attempts: Arc<AttemptCounter>) -> Self {
        Self {
            link,
            store,
            attempts,
            machine: AuthStateMachine::new(),
        }
    }

    /// Receive a new password twice until both copies match.
    ///
    /// A matching password is saved before the interface is told, so a
    /// reported match always means the password is stored. Returns the number
    /// of rounds it took.
    pub async fn set_new(&mut self) -> Result<u32> {
        let mut rounds = 0;
        loop {
            rounds += 1;

            let primary = self.link.receive_credential().await?;
            self.machine.transition_to(AuthState::CollectingConfirmation)?;
            let confirmation = self.link.receive_credential().await?;
            self.machine.transition_to(AuthState::Verifying)?;

            let status = primary.compare(&confirmation);
            if status.is_matching() {
                self.store.save(&primary).await?;
            }
            self.link.send_status(status).await?;
            self.machine.transition_to(AuthState::CollectingPrimary)?;

            if status.is_matching() {
                info!(rounds, "New password stored");
                return Ok(rounds);
            }
            debug!(rounds, "Passwords did not match");
        }
    }

    /// Verify one password and, on success, receive the command it unlocks.
    ///
    /// Returns `Command::None` for a wrong password below the cap and
    /// `Command::Alarm` when the cap is reached (the counter is reset) or when
    /// the interface sends an alarm in place of a password.
    pub async fn receive_command(&mut self) -> Result<Command> {
        let received = match self.link.receive_credential_or_alarm().await? {
            Incoming::Credential(credential) => credential,
            Incoming::Alarm => {
                self.attempts.reset();
                self.machine.transition_to(AuthState::Locked)?;
                warn!("Alarm requested by interface");
                return Ok(Command::Alarm);
            }
        };

        self.machine.transition_to(AuthState::Verifying)?;
        let status = self.check(&received).await?;
        self.link.send_status(status).await?;

        if status.is_matching() {
            self.attempts.reset();
            self.machine.transition_to(AuthState::CollectingPrimary)?;
            return self.next_command().await;
        }

        let failures = self.attempts.increment();
        if failures >= MAX_WRONG_PASSWORDS {
            self.attempts.reset();
            self.machine.transition_to(AuthState::Locked)?;
            warn!(failures, "Too many wrong passwords");
            return Ok(Command::Alarm);
        }

        self.machine.transition_to(AuthState::CollectingPrimary)?;
        debug!(failures, "Wrong password");
        Ok(Command::None)
    }

    /// Back to `CollectingPrimary` once the alarm has run.
    pub fn unlock(&mut self) -> Result<()> {
        if self.machine.is_locked() {
            self.machine.transition_to(AuthState::CollectingPrimary)?;
        }
        Ok(())
    }

    async fn check(&mut self, received: &Credential) -> Result<PasswordStatus> {
        let stored = self.store.load().await?;
        Ok(received.compare(&stored))
    }

    /// An unknown command byte is logged and treated as no command.
    async fn next_command(&mut self) -> Result<Command> {
        match self.link.receive_command().await {
            Ok(command) => Ok(command),
            Err(Error::UnknownWireByte { byte, .. }) => {
                warn!(byte, "Unknown command byte ignored");
                Ok(Command::None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn state(&self) -> &AuthStateMachine {
        &self.machine
    }

    pub fn attempts(&self) -> &AttemptCounter {
        &self.attempts
    }

    pub fn store(&self) -> &CredentialStore<M> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CredentialStore<M> {
        &mut self.store
    }

    pub fn into_parts(self) -> (SerialLink<S>, CredentialStore<M>) {
        (self.link, self.store)
    }
}
