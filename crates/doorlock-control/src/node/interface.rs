//! The interface node: menu, password entry and status screens.

use crate::auth::{InterfaceAuth, Verification};
use crate::error::Result;
use crate::messages;
use crate::sequence::{self, Screen, ScreenTarget, Sequence, SequenceController};
use crate::state::DeviceState;
use doorlock_core::{Command, DoorlockConfig};
use doorlock_hardware::{DisplayDevice, KeypadDevice, KeypadInput, TimerDevice};
use doorlock_protocol::SerialLink;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, trace, warn};

/// How long the welcome screen stays up.
pub const WELCOME_DURATION: Duration = Duration::from_secs(2);

/// Main menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    OpenDoor,
    ChangePassword,
}

impl MenuChoice {
    fn from_key(key: KeypadInput) -> Option<Self> {
        match key {
            KeypadInput::Plus => Some(Self::OpenDoor),
            KeypadInput::Minus => Some(Self::ChangePassword),
            _ => None,
        }
    }
}

/// What one pass through the main loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    DoorOpened,
    PasswordChanged,
    Alarm,
}

/// Interface node controller.
pub struct InterfaceNode<S, K, D, T> {
    auth: InterfaceAuth<S, K, D>,
    sequencer: SequenceController<T>,
    door_screen: Sequence<ScreenTarget>,
    alarm_screen: Sequence<ScreenTarget>,
    notice: Duration,
    state: DeviceState,
}

impl<S, K, D, T> InterfaceNode<S, K, D, T>
where
    S: AsyncRead + AsyncWrite + Unpin,
    K: KeypadDevice,
    D: DisplayDevice,
    T: TimerDevice,
{
    /// Assemble the node. Sequence periods come from `config.timing`, the
    /// notice duration from `config.interface`.
    pub fn new(
        link: SerialLink<S>,
        keypad: K,
        display: D,
        timer: T,
        config: &DoorlockConfig,
    ) -> Result<Self> {
        let state = DeviceState::new();
        let notice = config.interface.notice();
        Ok(Self {
            auth: InterfaceAuth::new(link, keypad, display, state.attempts().clone(), notice),
            sequencer: SequenceController::new(timer, state.ticks().clone()),
            door_screen: sequence::door_screen(&config.timing)?,
            alarm_screen: sequence::alarm_screen(&config.timing)?,
            notice,
            state,
        })
    }

    /// Welcome screen, then the initial password.
    pub async fn provision(&mut self) -> Result<()> {
        let display = self.auth.display_mut();
        display.clear().await?;
        display.show(messages::WELCOME_TITLE, 0, 0).await?;
        tokio::time::sleep(WELCOME_DURATION).await;
        display.clear().await?;

        info!("Setting initial password");
        self.auth.set_new().await?;
        Ok(())
    }

    /// Show the main menu and wait for `+` or `-`.
    pub async fn menu(&mut self) -> Result<MenuChoice> {
        let display = self.auth.display_mut();
        display.clear().await?;
        display.show(messages::MENU_OPEN_DOOR, 0, 0).await?;
        display.show(messages::MENU_CHANGE_PASSWORD, 1, 0).await?;

        let choice = loop {
            let key = self.auth.keypad_mut().read_input().await?;
            match MenuChoice::from_key(key) {
                Some(choice) => break choice,
                None => trace!(key = %key.as_char(), "Key ignored at menu"),
            }
        };

        self.auth.display_mut().clear().await?;
        Ok(choice)
    }

    /// One pass through the main loop: menu, password, action.
    pub async fn step(&mut self) -> Result<Outcome> {
        let choice = self.menu().await?;

        match self.auth.verify().await? {
            Verification::Verified => match choice {
                MenuChoice::OpenDoor => {
                    self.open_door().await?;
                    Ok(Outcome::DoorOpened)
                }
                MenuChoice::ChangePassword => {
                    self.change_password().await?;
                    Ok(Outcome::PasswordChanged)
                }
            },
            Verification::Locked => {
                self.alarm().await?;
                Ok(Outcome::Alarm)
            }
        }
    }

    /// Provision, then serve the menu until a fault.
    pub async fn run(&mut self) -> Result<()> {
        self.provision().await?;
        loop {
            let outcome = self.step().await?;
            info!(?outcome, "Menu action complete");
        }
    }

    async fn open_door(&mut self) -> Result<()> {
        self.auth.send_command(Command::OpenDoor).await?;
        self.sequencer
            .run(&self.door_screen, &mut Screen(self.auth.display_mut()))
            .await
    }

    async fn change_password(&mut self) -> Result<()> {
        self.auth.send_command(Command::ChangePassword).await?;
        self.auth.set_new().await?;

        let display = self.auth.display_mut();
        display.show(messages::PASSWORD_CHANGED, 0, 0).await?;
        tokio::time::sleep(self.notice).await;
        display.clear().await?;
        Ok(())
    }

    async fn alarm(&mut self) -> Result<()> {
        warn!("Lockout");
        self.sequencer
            .run(&self.alarm_screen, &mut Screen(self.auth.display_mut()))
            .await?;
        self.state.attempts().reset();
        self.auth.unlock()
    }

    pub fn auth(&self) -> &InterfaceAuth<S, K, D> {
        &self.auth
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }
}
