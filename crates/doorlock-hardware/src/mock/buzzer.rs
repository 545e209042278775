//! Mock alarm buzzer.

use crate::{Result, mock::EventLog, traits::BuzzerDevice, types::BuzzerState};

/// Mock buzzer that records on/off switching.
#[derive(Debug)]
pub struct MockBuzzer {
    log: EventLog<BuzzerState>,
}

impl MockBuzzer {
    pub fn new() -> (Self, MockBuzzerHandle) {
        let log = EventLog::new();
        (Self { log: log.clone() }, MockBuzzerHandle { log })
    }
}

impl BuzzerDevice for MockBuzzer {
    async fn on(&mut self) -> Result<()> {
        self.log.record(BuzzerState::On);
        Ok(())
    }

    async fn off(&mut self) -> Result<()> {
        self.log.record(BuzzerState::Off);
        Ok(())
    }
}

/// Read side of a [`MockBuzzer`].
#[derive(Debug, Clone)]
pub struct MockBuzzerHandle {
    log: EventLog<BuzzerState>,
}

impl MockBuzzerHandle {
    pub fn is_on(&self) -> bool {
        self.log.last() == Some(BuzzerState::On)
    }

    pub fn states(&self) -> Vec<BuzzerState> {
        self.log.events()
    }

    pub fn events(&self) -> &EventLog<BuzzerState> {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buzzer_switching() {
        let (mut buzzer, handle) = MockBuzzer::new();
        assert!(!handle.is_on());

        buzzer.on().await.unwrap();
        assert!(handle.is_on());

        buzzer.off().await.unwrap();
        assert!(!handle.is_on());
        assert_eq!(handle.states(), vec![BuzzerState::On, BuzzerState::Off]);
    }
}
