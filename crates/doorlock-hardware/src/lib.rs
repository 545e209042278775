//! Peripheral abstraction layer for the doorlock nodes.
//!
//! The node controllers never talk to pins or buses directly. They go
//! through the traits in [`traits`]:
//!
//! | Trait | Node | Real part |
//! |-------|------|-----------|
//! | [`KeypadDevice`] | interface | 4x4 keypad |
//! | [`DisplayDevice`] | interface | 2-line character LCD |
//! | [`MotorDevice`] | guard | DC motor behind an H-bridge |
//! | [`BuzzerDevice`] | guard | active buzzer |
//! | [`NonVolatileMemory`] | guard | 24C16 I2C EEPROM |
//! | [`TimerDevice`] | both | 16-bit compare-match timer |
//!
//! # Implementations
//!
//! - [`mock`]: channel-fed keypad, recording display/motor/buzzer, in-memory
//!   EEPROM. Each mock returns a cloneable handle for driving or observing it.
//! - [`timer::TokioTimer`]: the sequencing timer over `tokio::time`.
//!
//! # Example
//!
//! ```
//! use doorlock_hardware::mock::{MockKeypad, MockDisplay};
//! use doorlock_hardware::traits::{DisplayDevice, KeypadDevice, KeypadInput};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorlock_hardware::Result<()> {
//! let (mut keypad, keys) = MockKeypad::new();
//! let (mut lcd, screen) = MockDisplay::new();
//!
//! keys.send_keys("7").await?;
//! if let KeypadInput::Digit(_) = keypad.read_input().await? {
//!     lcd.show("*", 1, 0).await?;
//! }
//! assert!(screen.line(1).starts_with('*'));
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] with
//! [`HardwareError`].

pub mod error;
pub mod mock;
pub mod timer;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use timer::TokioTimer;
pub use traits::{
    BuzzerDevice, DisplayDevice, KeypadDevice, KeypadInput, MotorDevice, NonVolatileMemory,
    TickHandler, TimerDevice,
};
pub use types::{BuzzerState, DisplayEvent, MotorDirection, TimerMode};
