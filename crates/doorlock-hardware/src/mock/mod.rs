//! Mock device implementations for testing and simulation.
//!
//! Every mock comes with a cloneable handle. Input devices (keypad) are fed
//! through their handle; output devices (display, motor, buzzer) record what
//! they were told, with a `tokio::time::Instant` timestamp, so tests can
//! check both order and timing under a paused clock.

pub mod buzzer;
pub mod display;
pub mod eeprom;
pub mod keypad;
pub mod motor;

pub use buzzer::{MockBuzzer, MockBuzzerHandle};
pub use display::{MockDisplay, MockDisplayHandle, VirtualLcd};
pub use eeprom::MemoryEeprom;
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use motor::{MockMotor, MockMotorHandle};

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

/// An event with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamped<E> {
    pub at: Instant,
    pub event: E,
}

/// Shared, append-only record of device events.
#[derive(Debug)]
pub struct EventLog<E> {
    events: Arc<Mutex<Vec<Timestamped<E>>>>,
}

impl<E> Clone for EventLog<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E: Clone> EventLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: E) {
        self.lock().push(Timestamped {
            at: Instant::now(),
            event,
        });
    }

    /// Copy of every recorded event, oldest first.
    pub fn snapshot(&self) -> Vec<Timestamped<E>> {
        self.lock().clone()
    }

    /// Recorded events without timestamps.
    pub fn events(&self) -> Vec<E> {
        self.lock().iter().map(|e| e.event.clone()).collect()
    }

    pub fn last(&self) -> Option<E> {
        self.lock().last().map(|e| e.event.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Timestamped<E>>> {
        // A panicking test thread must not hide the events from the others
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
