//! `doorlock`: run either node of the door lock, or both at once.
//!
//! ```text
//! doorlock guard --listen 127.0.0.1:7070
//! doorlock interface --connect 127.0.0.1:7070
//! doorlock simulate --time-scale 10
//! ```
//!
//! A TCP connection stands in for the serial cable. The interface reads keys
//! from stdin (`0-9 + - * / = C`, one or more per line) and draws the LCD on
//! stdout; logs go to stderr.

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;

pub use cli::{Cli, NodeCommand};

use tracing_subscriber::EnvFilter;

/// Install the log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
