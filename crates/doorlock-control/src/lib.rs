//! Node controllers for the two-board door lock.
//!
//! The **interface** node owns the keypad and display; the **guard** node
//! owns the password EEPROM, the door motor and the buzzer. They talk over a
//! serial link ([`doorlock_protocol::SerialLink`]).
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`state`] | tick and attempt counters shared with the timer |
//! | [`auth`] | set/verify password flows and their state machine |
//! | [`sequence`] | tick-driven door and alarm sequences |
//! | [`node`] | start-up and main loops of both nodes |
//!
//! # Example
//!
//! Both nodes in one task over an in-memory link:
//!
//! ```no_run
//! use doorlock_control::node::{GuardNode, InterfaceNode};
//! use doorlock_core::DoorlockConfig;
//! use doorlock_hardware::TokioTimer;
//! use doorlock_hardware::mock::{MemoryEeprom, MockBuzzer, MockDisplay, MockKeypad, MockMotor};
//! use doorlock_protocol::SerialLink;
//! use doorlock_storage::CredentialStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorlock_control::Result<()> {
//! let config = DoorlockConfig::default();
//! let (a, b) = tokio::io::duplex(64);
//!
//! let (keypad, _keys) = MockKeypad::new();
//! let (display, _screen) = MockDisplay::new();
//! let mut interface = InterfaceNode::new(
//!     SerialLink::new(a), keypad, display, TokioTimer::new(), &config,
//! )?;
//!
//! let (motor, _door) = MockMotor::new();
//! let (buzzer, _siren) = MockBuzzer::new();
//! let store = CredentialStore::new(MemoryEeprom::default());
//! let mut guard = GuardNode::new(
//!     SerialLink::new(b), store, TokioTimer::new(), motor, buzzer, &config,
//! )?;
//!
//! tokio::try_join!(interface.run(), guard.run())?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod messages;
pub mod node;
pub mod sequence;
pub mod state;

pub use error::{ControlError, Result};
pub use state::{AttemptCounter, DeviceState, TickCounter};
