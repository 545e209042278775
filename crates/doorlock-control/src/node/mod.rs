//! Start-up and main loops of the two nodes.
//!
//! Both nodes provision a password first (the interface forces the user to
//! set one, the guard stores it), then loop:
//!
//! | Interface | Guard |
//! |-----------|-------|
//! | menu: `+` open door, `-` change password | wait for a password |
//! | verify the password | compare, report, count failures |
//! | send the command | receive the command |
//! | door screen / set new password / lockout screen | door / set new password / alarm |
//!
//! A node loop returns only on a fault: link closed, keypad gone, storage
//! unreadable.

pub mod guard;
pub mod interface;

pub use guard::GuardNode;
pub use interface::{InterfaceNode, MenuChoice, Outcome, WELCOME_DURATION};
