use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "doorlock")]
#[command(about = "Two-node keypad door lock", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: NodeCommand,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Give up on a silent peer in the middle of an exchange after this many milliseconds
    #[arg(long, global = true)]
    pub handshake_timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum NodeCommand {
    /// Run the guard node (password store, door motor, buzzer)
    Guard {
        /// Address to accept the interface connection on
        #[arg(short, long, default_value = "127.0.0.1:7070")]
        listen: SocketAddr,

        /// EEPROM image file
        #[arg(short, long)]
        eeprom: Option<PathBuf>,
    },

    /// Run the interface node (keypad on stdin, LCD on stdout)
    Interface {
        /// Address of the guard node
        #[arg(short = 'a', long, default_value = "127.0.0.1:7070")]
        connect: SocketAddr,
    },

    /// Run both nodes in one process over an in-memory link
    Simulate {
        /// Run the sequencing timers this many times faster
        #[arg(short, long, default_value = "1")]
        time_scale: u32,

        /// EEPROM image file; in memory if omitted
        #[arg(short, long)]
        eeprom: Option<PathBuf>,
    },
}
