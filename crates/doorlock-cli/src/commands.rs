//! Subcommand handlers.

use crate::cli::{Cli, NodeCommand};
use crate::config;
use crate::console::{ConsoleBuzzer, ConsoleDisplay, ConsoleMotor, LineKeypad};
use anyhow::{Context, Result};
use doorlock_control::ControlError;
use doorlock_control::node::{GuardNode, InterfaceNode};
use doorlock_core::DoorlockConfig;
use doorlock_hardware::mock::MemoryEeprom;
use doorlock_hardware::{HardwareError, NonVolatileMemory, TokioTimer};
use doorlock_protocol::SerialLink;
use doorlock_storage::{CredentialStore, FileEeprom};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

/// Buffer size of the in-memory link used by `simulate`.
const SIMULATED_LINK_BUFFER: usize = 64;

pub async fn run(cli: Cli) -> Result<()> {
    let config = config::resolve(&cli).await?;

    match cli.command {
        NodeCommand::Guard { listen, .. } => guard(listen, &config).await,
        NodeCommand::Interface { connect } => interface(connect, &config).await,
        NodeCommand::Simulate { .. } => simulate(&config).await,
    }
}

/// Serve interface connections one at a time.
///
/// The EEPROM image survives reconnects; each new interface starts by
/// setting a password.
async fn guard(listen: SocketAddr, config: &DoorlockConfig) -> Result<()> {
    let path = config
        .storage
        .eeprom_path
        .clone()
        .unwrap_or_else(|| "doorlock.eeprom".into());

    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to listen on {listen}"))?;
    info!(%listen, eeprom = %path.display(), "Guard node ready");

    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        stream.set_nodelay(true)?;
        info!(%peer, "Interface connected");

        let eeprom = FileEeprom::open(&path, config.storage.eeprom_size)
            .await
            .with_context(|| format!("failed to open EEPROM image {}", path.display()))?;
        let store = CredentialStore::with_config(eeprom, &config.storage)?;

        let mut node = GuardNode::new(
            SerialLink::with_config(stream, config.link),
            store,
            TokioTimer::new(),
            ConsoleMotor::new(),
            ConsoleBuzzer::new(),
            config,
        )?;

        match node.run().await {
            Err(e) if e.is_link_closed() => info!(%peer, "Interface disconnected"),
            other => return other.context("guard node stopped"),
        }
    }
}

async fn interface(connect: SocketAddr, config: &DoorlockConfig) -> Result<()> {
    let stream = TcpStream::connect(connect)
        .await
        .with_context(|| format!("failed to connect to guard at {connect}"))?;
    stream.set_nodelay(true)?;
    info!(%connect, "Connected to guard");

    let mut node = InterfaceNode::new(
        SerialLink::with_config(stream, config.link),
        LineKeypad::stdin(),
        ConsoleDisplay::stdout(),
        TokioTimer::new(),
        config,
    )?;

    node.run().await.context("interface node stopped")
}

/// Both nodes in this task, joined by an in-memory pipe.
async fn simulate(config: &DoorlockConfig) -> Result<()> {
    let (a, b) = tokio::io::duplex(SIMULATED_LINK_BUFFER);

    let mut interface = InterfaceNode::new(
        SerialLink::with_config(a, config.link),
        LineKeypad::stdin(),
        ConsoleDisplay::stdout(),
        TokioTimer::new(),
        config,
    )?;

    let result = match &config.storage.eeprom_path {
        Some(path) => {
            let eeprom = FileEeprom::open(path, config.storage.eeprom_size)
                .await
                .with_context(|| format!("failed to open EEPROM image {}", path.display()))?;
            let store = CredentialStore::with_config(eeprom, &config.storage)?;
            let mut guard = simulated_guard(b, store, config)?;
            tokio::try_join!(interface.run(), guard.run()).map(|_| ())
        }
        None => {
            let eeprom = MemoryEeprom::new(config.storage.eeprom_size);
            let store = CredentialStore::with_config(eeprom, &config.storage)?;
            let mut guard = simulated_guard(b, store, config)?;
            tokio::try_join!(interface.run(), guard.run()).map(|_| ())
        }
    };

    match result {
        // Closing stdin ends the simulation.
        Err(ControlError::Hardware(e @ HardwareError::Disconnected { .. })) => {
            warn!(error = %e, "Simulation ended");
            Ok(())
        }
        other => other.context("simulation stopped"),
    }
}

fn simulated_guard<M: NonVolatileMemory>(
    link: tokio::io::DuplexStream,
    store: CredentialStore<M>,
    config: &DoorlockConfig,
) -> Result<GuardNode<tokio::io::DuplexStream, M, TokioTimer, ConsoleMotor, ConsoleBuzzer>> {
    Ok(GuardNode::new(
        SerialLink::with_config(link, config.link),
        store,
        TokioTimer::new(),
        ConsoleMotor::new(),
        ConsoleBuzzer::new(),
        config,
    )?)
}
