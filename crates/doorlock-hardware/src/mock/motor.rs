//! Mock door motor that records every direction change.

use crate::{Result, mock::EventLog, traits::MotorDevice, types::MotorDirection};
use std::time::Duration;

/// Mock motor device.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockMotor;
/// use doorlock_hardware::traits::MotorDevice;
/// use doorlock_hardware::types::MotorDirection;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> doorlock_hardware::Result<()> {
/// let (mut motor, handle) = MockMotor::new();
/// motor.set_direction(MotorDirection::Forward).await?;
/// motor.set_direction(MotorDirection::Off).await?;
///
/// assert_eq!(handle.directions(), vec![MotorDirection::Forward, MotorDirection::Off]);
/// assert_eq!(handle.current(), MotorDirection::Off);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockMotor {
    log: EventLog<MotorDirection>,
}

impl MockMotor {
    pub fn new() -> (Self, MockMotorHandle) {
        let log = EventLog::new();
        (Self { log: log.clone() }, MockMotorHandle { log })
    }
}

impl MotorDevice for MockMotor {
    async fn set_direction(&mut self, direction: MotorDirection) -> Result<()> {
        self.log.record(direction);
        Ok(())
    }
}

/// Read side of a [`MockMotor`].
#[derive(Debug, Clone)]
pub struct MockMotorHandle {
    log: EventLog<MotorDirection>,
}

impl MockMotorHandle {
    /// Every commanded direction, in order.
    pub fn directions(&self) -> Vec<MotorDirection> {
        self.log.events()
    }

    /// Last commanded direction; `Off` before the first command.
    pub fn current(&self) -> MotorDirection {
        self.log.last().unwrap_or_default()
    }

    /// How long each commanded direction was held before the next command.
    /// The last direction has no end and is not included.
    pub fn hold_times(&self) -> Vec<(MotorDirection, Duration)> {
        self.log
            .snapshot()
            .windows(2)
            .map(|pair| (pair[0].event, pair[1].at - pair[0].at))
            .collect()
    }

    pub fn events(&self) -> &EventLog<MotorDirection> {
        &self.log
    }
}
