//! The guard node: stores the password, drives the door and the buzzer.

use crate::auth::GuardAuth;
use crate::error::Result;
use crate::sequence::{self, Door, Sequence, SequenceController, Siren};
use crate::state::DeviceState;
use doorlock_core::{Command, DoorlockConfig};
use doorlock_hardware::{
    BuzzerDevice, BuzzerState, MotorDevice, MotorDirection, NonVolatileMemory, TimerDevice,
};
use doorlock_protocol::SerialLink;
use doorlock_storage::CredentialStore;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

/// Guard node controller.
pub struct GuardNode<S, M, T, Mo, B> {
    auth: GuardAuth<S, M>,
    sequencer: SequenceController<T>,
    motor: Mo,
    buzzer: B,
    door: Sequence<MotorDirection>,
    alarm: Sequence<BuzzerState>,
    state: DeviceState,
}

impl<S, M, T, Mo, B> GuardNode<S, M, T, Mo, B>
where
    S: AsyncRead + AsyncWrite + Unpin,
    M: NonVolatileMemory,
    T: TimerDevice,
    Mo: MotorDevice,
    B: BuzzerDevice,
{
    /// Assemble the node. Sequence periods come from `config.timing`.
    pub fn new(
        link: SerialLink<S>,
        store: CredentialStore<M>,
        timer: T,
        motor: Mo,
        buzzer: B,
        config: &DoorlockConfig,
    ) -> Result<Self> {
        let state = DeviceState::new();
        Ok(Self {
            auth: GuardAuth::new(link, store, state.attempts().clone()),
            sequencer: SequenceController::new(timer, state.ticks().clone()),
            motor,
            buzzer,
            door: sequence::door_sequence(&config.timing)?,
            alarm: sequence::alarm_sequence(&config.timing)?,
            state,
        })
    }

    /// Receive and store the initial password.
    pub async fn provision(&mut self) -> Result<()> {
        info!("Waiting for initial password");
        self.auth.set_new().await?;
        Ok(())
    }

    /// One authenticated command, dispatched. Returns what was received.
    pub async fn step(&mut self) -> Result<Command> {
        let command = self.auth.receive_command().await?;
        self.dispatch(command).await?;
        Ok(command)
    }

    /// Provision, then serve commands until a fault.
    pub async fn run(&mut self) -> Result<()> {
        self.provision().await?;
        loop {
            self.step().await?;
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::OpenDoor => {
                info!("Opening door");
                self.sequencer
                    .run(&self.door, &mut Door(&mut self.motor))
                    .await
            }
            Command::ChangePassword => {
                info!("Changing password");
                self.auth.set_new().await?;
                Ok(())
            }
            Command::Alarm => {
                info!("Sounding alarm");
                self.sequencer
                    .run(&self.alarm, &mut Siren(&mut self.buzzer))
                    .await?;
                self.auth.unlock()
            }
            Command::None => {
                debug!("No command");
                Ok(())
            }
        }
    }

    pub fn auth(&self) -> &GuardAuth<S, M> {
        &self.auth
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }
}
