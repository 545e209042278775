//! Adapters from peripherals to [`Actuator`]s.

use super::Actuator;
use crate::error::Result;
use doorlock_hardware::{BuzzerDevice, BuzzerState, DisplayDevice, MotorDevice, MotorDirection};

/// Door motor driven by direction.
#[derive(Debug)]
pub struct Door<'a, M>(pub &'a mut M);

impl<M: MotorDevice> Actuator<MotorDirection> for Door<'_, M> {
    async fn apply(&mut self, target: &MotorDirection) -> Result<()> {
        self.0.set_direction(*target).await?;
        Ok(())
    }
}

/// Buzzer switched on and off.
#[derive(Debug)]
pub struct Siren<'a, B>(pub &'a mut B);

impl<B: BuzzerDevice> Actuator<BuzzerState> for Siren<'_, B> {
    async fn apply(&mut self, target: &BuzzerState) -> Result<()> {
        match target {
            BuzzerState::On => self.0.on().await?,
            BuzzerState::Off => self.0.off().await?,
        }
        Ok(())
    }
}

/// What a screen phase shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenTarget {
    Blank,
    /// Two lines; an empty line is left blank.
    Text { top: String, bottom: String },
}

impl ScreenTarget {
    pub fn line(top: impl Into<String>) -> Self {
        Self::Text {
            top: top.into(),
            bottom: String::new(),
        }
    }

    pub fn lines(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self::Text {
            top: top.into(),
            bottom: bottom.into(),
        }
    }
}

/// Character display showing one screen per phase.
#[derive(Debug)]
pub struct Screen<'a, D>(pub &'a mut D);

impl<D: DisplayDevice> Actuator<ScreenTarget> for Screen<'_, D> {
    async fn apply(&mut self, target: &ScreenTarget) -> Result<()> {
        self.0.clear().await?;
        if let ScreenTarget::Text { top, bottom } = target {
            if !top.is_empty() {
                self.0.show(top, 0, 0).await?;
            }
            if !bottom.is_empty() {
                self.0.show(bottom, 1, 0).await?;
            }
        }
        Ok(())
    }
}
