//! Lock-step serial protocol between the interface and guard nodes.
//!
//! See [`SerialLink`] for the handshake rules.

pub mod link;

pub use link::{Incoming, SerialLink};
