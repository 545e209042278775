//! Common types shared by device traits and implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rotation command for the door motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorDirection {
    /// Clockwise, opening the door.
    Forward,
    /// Anti-clockwise, closing the door.
    Reverse,
    /// Motor stopped.
    #[default]
    Off,
}

impl fmt::Display for MotorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorDirection::Forward => write!(f, "forward"),
            MotorDirection::Reverse => write!(f, "reverse"),
            MotorDirection::Off => write!(f, "off"),
        }
    }
}

/// State of the buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuzzerState {
    On,
    #[default]
    Off,
}

/// How the sequencing timer behaves after an expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Expire every period until disabled (clear-timer-on-compare).
    #[default]
    Compare,
    /// Expire once, then disable itself.
    OneShot,
}

/// Something written to a character display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayEvent {
    Show { text: String, row: usize, col: usize },
    Clear,
}
