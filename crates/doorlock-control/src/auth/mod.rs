//! Password set/verify flows for both nodes.
//!
//! [`InterfaceAuth`] captures passwords on the keypad and sends them;
//! [`GuardAuth`] receives them and compares against the stored credential.
//! The two run in lock step over the serial link:
//!
//! ```text
//! interface                               guard
//!   set_new:  credential ──────────────►  receive_credential
//!             credential ──────────────►  receive_credential
//!                                          save (on match)
//!             receive_status ◄──────────  status
//!
//!   verify:   credential ──────────────►  receive_credential_or_alarm
//!             receive_status ◄──────────  status
//!             command ─────────────────►  receive_command (on match)
//! ```
//!
//! Lockout boundaries differ on purpose: the guard raises the alarm when its
//! failure count *reaches* the cap; the interface counts attempts before
//! making them and locks once the count *exceeds* the cap. With a cap of 3
//! both lock after the third wrong password.

pub mod guard;
pub mod interface;
pub mod state;

pub use guard::GuardAuth;
pub use interface::{InterfaceAuth, Verification};
pub use state::{AuthState, AuthStateMachine, AuthTransition};
