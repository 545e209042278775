//! Tick-driven actuator sequences.
//!
//! A [`Sequence`] is an ordered list of phases. Each phase drives an
//! actuator to a target and holds it until the tick counter reaches the
//! phase threshold; thresholds are cumulative over the whole sequence.
//! When the last phase ends the actuator goes to its resting target.
//!
//! | Plan | Phases (target / period / until tick) | Resting |
//! |------|----------------------------------------|---------|
//! | door | forward / long / 2, off / short / 3, reverse / long / 5 | off |
//! | alarm | on / long / 8 | off |
//! | door screen | opening / long / 2, open / short / 3, closing / long / 5 | blank |
//! | alarm screen | lockout warning / long / 8 | blank |
//!
//! The [`SequenceController`] owns the node's timer. It configures the timer
//! for the first phase, retunes it in place when a later phase uses a
//! different period, and disables it at the end. The tick counter is zero
//! before and after every sequence.

#![allow(async_fn_in_trait)]

pub mod actuators;
pub mod plans;

pub use actuators::{Door, Screen, ScreenTarget, Siren};
pub use plans::{alarm_screen, alarm_sequence, door_screen, door_sequence};

use crate::error::Result;
use crate::state::TickCounter;
use doorlock_core::Error;
use doorlock_hardware::{TimerDevice, TimerMode};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Something a sequence can drive to a target.
pub trait Actuator<T> {
    async fn apply(&mut self, target: &T) -> Result<()>;
}

/// One step of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase<T> {
    pub target: T,
    /// Timer period while this phase runs.
    pub period: Duration,
    /// Tick count that ends the phase, counted from the sequence start.
    pub until_tick: u32,
}

impl<T> Phase<T> {
    pub fn new(target: T, period: Duration, until_tick: u32) -> Self {
        Self {
            target,
            period,
            until_tick,
        }
    }
}

/// Validated list of phases plus the resting target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<T> {
    name: &'static str,
    phases: Vec<Phase<T>>,
    resting: T,
}

impl<T> Sequence<T> {
    /// Build a sequence.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSequence` if there are no phases, a period is
    /// zero, or the thresholds are not strictly increasing from above zero.
    pub fn new(name: &'static str, phases: Vec<Phase<T>>, resting: T) -> doorlock_core::Result<Self> {
        if phases.is_empty() {
            return Err(Error::InvalidSequence(format!("{name}: no phases")));
        }

        let mut previous = 0;
        for (index, phase) in phases.iter().enumerate() {
            if phase.period.is_zero() {
                return Err(Error::InvalidSequence(format!(
                    "{name}: phase {index} has a zero period"
                )));
            }
            if phase.until_tick <= previous {
                return Err(Error::InvalidSequence(format!(
                    "{name}: phase {index} ends at tick {} after tick {previous}",
                    phase.until_tick
                )));
            }
            previous = phase.until_tick;
        }

        Ok(Self {
            name,
            phases,
            resting,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phases(&self) -> &[Phase<T>] {
        &self.phases
    }

    pub fn resting(&self) -> &T {
        &self.resting
    }

    /// Tick count at which the sequence ends.
    pub fn total_ticks(&self) -> u32 {
        self.phases.last().map_or(0, |phase| phase.until_tick)
    }

    /// Time from start to the last expiry.
    pub fn total_duration(&self) -> Duration {
        let mut previous = 0;
        self.phases
            .iter()
            .map(|phase| {
                let ticks = phase.until_tick - previous;
                previous = phase.until_tick;
                phase.period * ticks
            })
            .sum()
    }
}

/// Runs sequences on one timer.
pub struct SequenceController<T> {
    timer: T,
    ticks: Arc<TickCounter>,
}

impl<T: TimerDevice> SequenceController<T> {
    /// Take over `timer` and register the tick handler for `ticks` with it.
    pub fn new(mut timer: T, ticks: Arc<TickCounter>) -> Self {
        timer.set_handler(ticks.tick_handler());
        Self { timer, ticks }
    }

    /// Run `sequence` to completion against `actuator`.
    ///
    /// There is no early exit. If the actuator fails, the timer is still
    /// disabled and the tick counter reset before the error is returned.
    pub async fn run<X, A>(&mut self, sequence: &Sequence<X>, actuator: &mut A) -> Result<()>
    where
        X: Debug,
        A: Actuator<X>,
    {
        info!(sequence = sequence.name(), "Sequence started");
        self.ticks.reset();

        let result = self.run_phases(sequence, actuator).await;

        self.timer.disable();
        self.ticks.reset();
        result?;

        info!(sequence = sequence.name(), "Sequence finished");
        Ok(())
    }

    async fn run_phases<X, A>(&mut self, sequence: &Sequence<X>, actuator: &mut A) -> Result<()>
    where
        X: Debug,
        A: Actuator<X>,
    {
        for (index, phase) in sequence.phases().iter().enumerate() {
            actuator.apply(&phase.target).await?;

            match self.timer.period() {
                None => self.timer.configure(phase.period, TimerMode::Compare)?,
                Some(current) if current != phase.period => {
                    self.timer.change_period(phase.period)?
                }
                Some(_) => {}
            }

            self.ticks.wait_until(phase.until_tick).await;
            debug!(
                sequence = sequence.name(),
                phase = index,
                target = ?phase.target,
                ticks = self.ticks.get(),
                "Phase complete"
            );
        }

        actuator.apply(sequence.resting()).await
    }

    pub fn ticks(&self) -> &TickCounter {
        &self.ticks
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_hardware::TokioTimer;
    use rstest::rstest;
    use tokio::time::Instant;

    const SECOND: Duration = Duration::from_secs(1);

    /// Records each target with the time and tick count it was applied at.
    struct Recorder {
        ticks: Arc<TickCounter>,
        applied: Vec<(u32, Instant, u32)>,
    }

    impl Recorder {
        fn new(ticks: Arc<TickCounter>) -> Self {
            Self {
                ticks,
                applied: Vec::new(),
            }
        }
    }

    impl Actuator<u32> for Recorder {
        async fn apply(&mut self, target: &u32) -> Result<()> {
            self.applied
                .push((*target, Instant::now(), self.ticks.get()));
            Ok(())
        }
    }

    #[rstest]
    #[case::empty(vec![])]
    #[case::zero_threshold(vec![Phase::new(1, SECOND, 0)])]
    #[case::zero_period(vec![Phase::new(1, Duration::ZERO, 1)])]
    #[case::not_increasing(vec![Phase::new(1, SECOND, 2), Phase::new(2, SECOND, 2)])]
    fn test_invalid_sequences(#[case] phases: Vec<Phase<u32>>) {
        let err = Sequence::new("test", phases, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidSequence(_)));
    }

    #[test]
    fn test_total_duration() {
        let sequence = Sequence::new(
            "test",
            vec![Phase::new(1, 2 * SECOND, 2), Phase::new(2, SECOND, 5)],
            0,
        )
        .unwrap();

        assert_eq!(sequence.total_ticks(), 5);
        assert_eq!(sequence.total_duration(), 7 * SECOND);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phases_follow_thresholds() {
        let ticks = Arc::new(TickCounter::new());
        let mut controller = SequenceController::new(TokioTimer::new(), ticks.clone());
        let sequence = Sequence::new(
            "test",
            vec![
                Phase::new(1, 2 * SECOND, 1),
                Phase::new(2, 2 * SECOND, 3),
                Phase::new(3, SECOND, 4),
            ],
            0,
        )
        .unwrap();

        let start = Instant::now();
        let mut recorder = Recorder::new(ticks.clone());
        controller.run(&sequence, &mut recorder).await.unwrap();

        let offsets: Vec<(u32, Duration)> = recorder
            .applied
            .iter()
            .map(|(target, at, _)| (*target, *at - start))
            .collect();
        assert_eq!(
            offsets,
            vec![
                (1, Duration::ZERO),
                (2, 2 * SECOND),
                (3, 6 * SECOND),
                (0, 7 * SECOND),
            ]
        );
        assert_eq!(ticks.get(), 0);
        assert!(controller.timer().period().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_phase_starts_from_zero_ticks() {
        let ticks = Arc::new(TickCounter::new());
        let stale = ticks.tick_handler();
        for _ in 0..3 {
            (*stale)();
        }
        assert_eq!(ticks.get(), 3);

        let mut controller = SequenceController::new(TokioTimer::new(), ticks.clone());
        let sequence = Sequence::new(
            "test",
            vec![Phase::new(1, SECOND, 2), Phase::new(2, SECOND, 3)],
            0,
        )
        .unwrap();

        let mut recorder = Recorder::new(ticks.clone());
        controller.run(&sequence, &mut recorder).await.unwrap();

        let counts: Vec<(u32, u32)> = recorder
            .applied
            .iter()
            .map(|(target, _, count)| (*target, *count))
            .collect();
        assert_eq!(counts, vec![(1, 0), (2, 2), (0, 3)]);
        assert_eq!(ticks.get(), 0);
    }

    struct Failing;

    impl Actuator<u32> for Failing {
        async fn apply(&mut self, target: &u32) -> Result<()> {
            if *target == 2 {
                return Err(doorlock_hardware::HardwareError::disconnected("actuator").into());
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_disables_timer() {
        let ticks = Arc::new(TickCounter::new());
        let mut controller = SequenceController::new(TokioTimer::new(), ticks.clone());
        let sequence = Sequence::new(
            "test",
            vec![Phase::new(1, SECOND, 1), Phase::new(2, SECOND, 2)],
            0,
        )
        .unwrap();

        assert!(controller.run(&sequence, &mut Failing).await.is_err());
        assert_eq!(ticks.get(), 0);
        assert!(controller.timer().period().is_none());
    }
}
