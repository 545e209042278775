//! Shared device counters.
//!
//! Each node owns one [`DeviceState`]. Its two counters are the only state
//! shared between the control flow and the timer task:
//!
//! | Counter | Written by | Read by |
//! |---------|------------|---------|
//! | [`TickCounter`] | timer handler (increment), sequence controller (reset) | sequence controller |
//! | [`AttemptCounter`] | authentication engine | authentication engine, node |
//!
//! A waiter that reads a stale tick count only loops once more; the counter
//! never goes backwards while a sequence runs.

use doorlock_hardware::TickHandler;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use tokio::sync::Notify;
use tracing::trace;

/// Timer expiries since the current sequence started.
///
/// The count is advanced only through the closure returned by
/// [`tick_handler`](Self::tick_handler), which is registered with the timer.
#[derive(Debug, Default)]
pub struct TickCounter {
    count: AtomicU32,
    notify: Notify,
}

impl TickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count.
    pub fn get(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Back to zero. Called at the start and end of a sequence.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    /// Wait until the count reaches `threshold`.
    pub async fn wait_until(&self, threshold: u32) {
        loop {
            let notified = self.notify.notified();
            if self.get() >= threshold {
                return;
            }
            notified.await;
        }
    }

    /// Handler to register with a [`TimerDevice`](doorlock_hardware::TimerDevice).
    pub fn tick_handler(self: &Arc<Self>) -> TickHandler {
        let counter = Arc::clone(self);
        Arc::new(move || counter.increment())
    }

    fn increment(&self) {
        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(count, "Tick");
        // A stored permit wakes a waiter that has not polled yet.
        self.notify.notify_one();
    }
}

/// Consecutive failed password attempts.
#[derive(Debug, Default)]
pub struct AttemptCounter(AtomicU8);

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::SeqCst)
    }

    /// Add one attempt and return the new count.
    pub fn increment(&self) -> u8 {
        self.0
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// Counters owned by one node.
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    ticks: Arc<TickCounter>,
    attempts: Arc<AttemptCounter>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> &Arc<TickCounter> {
        &self.ticks
    }

    pub fn attempts(&self) -> &Arc<AttemptCounter> {
        &self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_counter_starts_at_zero() {
        let ticks = TickCounter::new();
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn test_handler_advances_count() {
        let ticks = Arc::new(TickCounter::new());
        let handler = ticks.tick_handler();

        handler();
        handler();
        assert_eq!(ticks.get(), 2);

        ticks.reset();
        assert_eq!(ticks.get(), 0);
    }

    #[tokio::test]
    async fn test_wait_until_already_reached() {
        let ticks = Arc::new(TickCounter::new());
        let handler = ticks.tick_handler();
        handler();
        handler();
        handler();

        // Returns immediately, even with a stale permit pending.
        ticks.wait_until(2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_wakes_on_threshold() {
        let ticks = Arc::new(TickCounter::new());
        let handler = ticks.tick_handler();

        let ticker = async {
            for _ in 0..5 {
                tokio::time::sleep(Duration::from_secs(1)).await;
                handler();
            }
        };
        let waiter = async {
            let start = tokio::time::Instant::now();
            ticks.wait_until(3).await;
            start.elapsed()
        };

        let ((), waited) = tokio::join!(ticker, waiter);
        assert_eq!(waited, Duration::from_secs(3));
        assert_eq!(ticks.get(), 5);
    }

    #[test]
    fn test_attempt_counter() {
        let attempts = AttemptCounter::new();
        assert_eq!(attempts.increment(), 1);
        assert_eq!(attempts.increment(), 2);
        assert_eq!(attempts.get(), 2);

        attempts.reset();
        assert_eq!(attempts.get(), 0);
    }

    #[test]
    fn test_device_state_clones_share_counters() {
        let state = DeviceState::new();
        let shared = state.clone();

        state.attempts().increment();
        (state.ticks().tick_handler())();

        assert_eq!(shared.attempts().get(), 1);
        assert_eq!(shared.ticks().get(), 1);
    }
}
