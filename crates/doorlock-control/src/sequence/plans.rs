//! The canonical door and alarm plans.
//!
//! Periods come from the configured compare values; thresholds are fixed.

use super::{Phase, ScreenTarget, Sequence};
use crate::messages;
use doorlock_core::constants::{ALARM_TICKS, DOOR_CLOSED_TICKS, DOOR_HOLD_TICKS, DOOR_OPENED_TICKS};
use doorlock_core::{Result, TimingConfig};
use doorlock_hardware::{BuzzerState, MotorDirection};

/// Open, hold, close.
pub fn door_sequence(timing: &TimingConfig) -> Result<Sequence<MotorDirection>> {
    Sequence::new(
        "door",
        vec![
            Phase::new(MotorDirection::Forward, timing.long_period(), DOOR_OPENED_TICKS),
            Phase::new(MotorDirection::Off, timing.short_period(), DOOR_HOLD_TICKS),
            Phase::new(MotorDirection::Reverse, timing.long_period(), DOOR_CLOSED_TICKS),
        ],
        MotorDirection::Off,
    )
}

/// Buzzer on for the lockout period.
pub fn alarm_sequence(timing: &TimingConfig) -> Result<Sequence<BuzzerState>> {
    Sequence::new(
        "alarm",
        vec![Phase::new(BuzzerState::On, timing.long_period(), ALARM_TICKS)],
        BuzzerState::Off,
    )
}

/// Door progress on the interface display, in step with [`door_sequence`].
pub fn door_screen(timing: &TimingConfig) -> Result<Sequence<ScreenTarget>> {
    Sequence::new(
        "door screen",
        vec![
            Phase::new(
                ScreenTarget::line(messages::DOOR_OPENING),
                timing.long_period(),
                DOOR_OPENED_TICKS,
            ),
            Phase::new(
                ScreenTarget::line(messages::DOOR_OPEN),
                timing.short_period(),
                DOOR_HOLD_TICKS,
            ),
            Phase::new(
                ScreenTarget::line(messages::DOOR_CLOSING),
                timing.long_period(),
                DOOR_CLOSED_TICKS,
            ),
        ],
        ScreenTarget::Blank,
    )
}

/// Lockout warning on the interface display, in step with [`alarm_sequence`].
pub fn alarm_screen(timing: &TimingConfig) -> Result<Sequence<ScreenTarget>> {
    Sequence::new(
        "alarm screen",
        vec![Phase::new(
            ScreenTarget::lines(messages::LOCKOUT_TITLE, messages::LOCKOUT_HINT),
            timing.long_period(),
            ALARM_TICKS,
        )],
        ScreenTarget::Blank,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_door_plan() {
        let timing = TimingConfig::default();
        let door = door_sequence(&timing).unwrap();

        let targets: Vec<_> = door.phases().iter().map(|p| p.target).collect();
        assert_eq!(
            targets,
            vec![MotorDirection::Forward, MotorDirection::Off, MotorDirection::Reverse]
        );
        assert_eq!(door.resting(), &MotorDirection::Off);
        assert_eq!(
            door.total_duration(),
            timing.long_period() * 4 + timing.short_period()
        );
    }

    #[test]
    fn test_alarm_plan_lasts_about_a_minute() {
        let alarm = alarm_sequence(&TimingConfig::default()).unwrap();

        assert_eq!(alarm.total_ticks(), 8);
        assert_eq!(alarm.total_duration(), Duration::from_micros(60_000_256));
    }

    #[test]
    fn test_screen_plans_match_actuator_plans() {
        let timing = TimingConfig::default();
        let door = door_sequence(&timing).unwrap();
        let screen = door_screen(&timing).unwrap();

        assert_eq!(door.total_duration(), screen.total_duration());
        for (motor, text) in door.phases().iter().zip(screen.phases()) {
            assert_eq!(motor.period, text.period);
            assert_eq!(motor.until_tick, text.until_tick);
        }

        assert_eq!(
            alarm_sequence(&timing).unwrap().total_duration(),
            alarm_screen(&timing).unwrap().total_duration()
        );
    }
}
