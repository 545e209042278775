//! Sequencing timer backed by `tokio::time`.
//!
//! [`TokioTimer`] stands in for the hardware compare-match timer: once
//! configured, a background task sleeps until the next deadline and runs the
//! registered handler. Deadlines advance from the previous deadline rather
//! than from the moment the handler ran, so ticks do not drift.
//!
//! ```text
//! configure(7.5s)     change_period(3s)
//!      │                    │
//!      ├──── 7.5s ────┤──── 7.5s ────┤── 3s ──┤── 3s ──┤
//!                   tick           tick     tick     tick
//! ```
//!
//! A period change takes effect from the most recent expiry. Under a paused
//! tokio clock (`start_paused = true`) whole sequences complete instantly.

use crate::error::{HardwareError, Result};
use crate::traits::{TickHandler, TimerDevice};
use crate::types::TimerMode;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

/// Running timer task and the channel used to retune it.
struct Running {
    task: JoinHandle<()>,
    period_tx: watch::Sender<Duration>,
}

/// [`TimerDevice`] implementation over the tokio clock.
///
/// `configure` spawns onto the current runtime and must be called from
/// within one.
#[derive(Default)]
pub struct TokioTimer {
    handler: Option<TickHandler>,
    running: Option<Running>,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the timer task is still alive. A one-shot timer stops by
    /// itself after its expiry.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }
}

impl TimerDevice for TokioTimer {
    fn set_handler(&mut self, handler: TickHandler) {
        self.handler = Some(handler);
    }

    fn configure(&mut self, period: Duration, mode: TimerMode) -> Result<()> {
        if period.is_zero() {
            return Err(HardwareError::configuration("timer period must be > 0"));
        }
        let handler = self
            .handler
            .clone()
            .ok_or_else(|| HardwareError::configuration("no tick handler registered"))?;

        self.disable();

        let (period_tx, period_rx) = watch::channel(period);
        let task = tokio::spawn(run_timer(handler, period_rx, mode));
        self.running = Some(Running { task, period_tx });

        debug!(period_ms = period.as_millis() as u64, ?mode, "Timer configured");
        Ok(())
    }

    fn change_period(&mut self, period: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(HardwareError::configuration("timer period must be > 0"));
        }
        let running = self
            .running
            .as_ref()
            .filter(|running| !running.task.is_finished())
            .ok_or_else(|| HardwareError::configuration("timer not running"))?;

        running.period_tx.send_replace(period);
        debug!(period_ms = period.as_millis() as u64, "Timer period changed");
        Ok(())
    }

    fn disable(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
            debug!("Timer disabled");
        }
    }

    fn period(&self) -> Option<Duration> {
        self.running
            .as_ref()
            .filter(|running| !running.task.is_finished())
            .map(|running| *running.period_tx.borrow())
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}

async fn run_timer(handler: TickHandler, mut period_rx: watch::Receiver<Duration>, mode: TimerMode) {
    let mut period = *period_rx.borrow_and_update();
    let mut last_expiry = Instant::now();

    loop {
        let deadline = last_expiry + period;

        tokio::select! {
            () = sleep_until(deadline) => {
                last_expiry = deadline;
                trace!("Timer expired");
                handler();
                if mode == TimerMode::OneShot {
                    break;
                }
            }
            changed = period_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                period = *period_rx.borrow_and_update();
            }
        }
    }
}
