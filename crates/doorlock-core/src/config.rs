//! Startup configuration shared by both nodes.
//!
//! Every field has a default that reproduces the reference hardware, so an
//! empty configuration file is valid:
//!
//! ```
//! use doorlock_core::DoorlockConfig;
//!
//! let config = DoorlockConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.timing.long_period().as_millis(), 7500);
//! ```
//!
//! Timing values are read once at startup and never change while a node runs.

use crate::{
    Result,
    constants::{
        DEFAULT_CPU_FREQUENCY_HZ, DEFAULT_NOTICE_MS, DEFAULT_TIMER_PRESCALER, EEPROM_SIZE,
        PASSWORD_BASE_ADDRESS, PASSWORD_LENGTH, TIMER_COMPARE_VALUE_LONG,
        TIMER_COMPARE_VALUE_SHORT,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration, one section per concern.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorlockConfig {
    pub timing: TimingConfig,
    pub link: LinkConfig,
    pub storage: StorageConfig,
    pub interface: InterfaceConfig,
}

impl DoorlockConfig {
    /// Check every section.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.timing.validate()?;
        self.link.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

/// Sequencing timer parameters.
///
/// Periods are derived the way the hardware timer produces them:
/// `period = compare_value × prescaler / cpu_frequency_hz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub cpu_frequency_hz: u32,
    pub prescaler: u32,
    pub long_compare_value: u16,
    pub short_compare_value: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cpu_frequency_hz: DEFAULT_CPU_FREQUENCY_HZ,
            prescaler: DEFAULT_TIMER_PRESCALER,
            long_compare_value: TIMER_COMPARE_VALUE_LONG,
            short_compare_value: TIMER_COMPARE_VALUE_SHORT,
        }
    }
}

impl TimingConfig {
    /// Period of the long tick (~7.5 s with defaults).
    #[must_use]
    pub fn long_period(&self) -> Duration {
        self.period_for(self.long_compare_value)
    }

    /// Period of the short tick (~3 s with defaults).
    #[must_use]
    pub fn short_period(&self) -> Duration {
        self.period_for(self.short_compare_value)
    }

    /// Convert a compare value into a wall-clock period, rounded down to
    /// whole microseconds.
    #[must_use]
    pub fn period_for(&self, compare_value: u16) -> Duration {
        if self.cpu_frequency_hz == 0 {
            return Duration::ZERO;
        }
        let cycles = u64::from(compare_value) * u64::from(self.prescaler);
        let micros = cycles * 1_000_000 / u64::from(self.cpu_frequency_hz);
        Duration::from_micros(micros)
    }

    /// Builder: set the CPU frequency.
    #[must_use]
    pub fn with_cpu_frequency(mut self, hz: u32) -> Self {
        self.cpu_frequency_hz = hz;
        self
    }

    /// Builder: set the compare values.
    #[must_use]
    pub fn with_compare_values(mut self, long: u16, short: u16) -> Self {
        self.long_compare_value = long;
        self.short_compare_value = short;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.cpu_frequency_hz == 0 {
            return Err(Error::Config("timing.cpu_frequency_hz must be > 0".into()));
        }
        if self.prescaler == 0 {
            return Err(Error::Config("timing.prescaler must be > 0".into()));
        }
        if self.long_compare_value == 0 || self.short_compare_value == 0 {
            return Err(Error::Config(
                "timing compare values must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Serial link behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Bound on the waits inside an exchange that has started: the sender
    /// waiting for `ReceiverReady`, the receiver waiting for the payload.
    /// Waiting for a peer to open an exchange is never bounded. `None` blocks
    /// indefinitely.
    pub handshake_timeout_ms: Option<u64>,
}

impl LinkConfig {
    /// Builder: bound waits inside an exchange.
    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Handshake bound as a `Duration`, if any.
    #[must_use]
    pub fn handshake_timeout(&self) -> Option<Duration> {
        self.handshake_timeout_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> Result<()> {
        if self.handshake_timeout_ms == Some(0) {
            return Err(Error::Config(
                "link.handshake_timeout_ms must be > 0 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Guard node non-volatile storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub eeprom_size: usize,
    pub password_base_address: u16,
    /// Backing file for the EEPROM image. `None` keeps it in memory.
    pub eeprom_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            eeprom_size: EEPROM_SIZE,
            password_base_address: PASSWORD_BASE_ADDRESS,
            eeprom_path: None,
        }
    }
}

impl StorageConfig {
    /// Builder: persist the EEPROM image to a file.
    #[must_use]
    pub fn with_eeprom_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.eeprom_path = Some(path.into());
        self
    }

    fn validate(&self) -> Result<()> {
        let end = usize::from(self.password_base_address) + PASSWORD_LENGTH;
        if end > self.eeprom_size {
            return Err(Error::Config(format!(
                "credential region 0x{:04X}..0x{end:04X} exceeds EEPROM size {}",
                self.password_base_address, self.eeprom_size
            )));
        }
        Ok(())
    }
}

/// Interface node presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// How long notices stay on screen, in milliseconds.
    pub notice_ms: u64,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            notice_ms: DEFAULT_NOTICE_MS,
        }
    }
}

impl InterfaceConfig {
    #[must_use]
    pub fn notice(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_periods_match_hardware() {
        let timing = TimingConfig::default();
        // 58594 * 1024 / 8 MHz = 7.500032 s
        assert_eq!(timing.long_period(), Duration::from_micros(7_500_032));
        // 23438 * 1024 / 8 MHz = 3.000064 s
        assert_eq!(timing.short_period(), Duration::from_micros(3_000_064));
    }

    #[test]
    fn test_period_scales_with_frequency() {
        let timing = TimingConfig::default().with_cpu_frequency(16_000_000);
        assert_eq!(timing.long_period(), Duration::from_micros(3_750_016));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: DoorlockConfig = toml::from_str("").unwrap();
        assert_eq!(config, DoorlockConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config: DoorlockConfig = toml::from_str(
            r#"
            [link]
            handshake_timeout_ms = 500

            [storage]
            eeprom_path = "/tmp/eeprom.bin"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.link.handshake_timeout(),
            Some(Duration::from_millis(500))
        );
        assert_eq!(
            config.storage.eeprom_path,
            Some(PathBuf::from("/tmp/eeprom.bin"))
        );
        assert_eq!(config.storage.password_base_address, PASSWORD_BASE_ADDRESS);
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DoorlockConfig {
            link: LinkConfig::default().with_handshake_timeout(Duration::from_secs(2)),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let decoded: DoorlockConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, config);
    }

    #[rstest]
    #[case(TimingConfig::default().with_cpu_frequency(0))]
    #[case(TimingConfig::default().with_compare_values(0, 100))]
    #[case(TimingConfig::default().with_compare_values(100, 0))]
    #[case(TimingConfig { prescaler: 0, ..Default::default() })]
    fn test_invalid_timing_rejected(#[case] timing: TimingConfig) {
        let config = DoorlockConfig {
            timing,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_credential_region_must_fit() {
        let config = DoorlockConfig {
            storage: StorageConfig {
                eeprom_size: 0x0204,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DoorlockConfig {
            storage: StorageConfig {
                eeprom_size: 0x0205,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_handshake_timeout_rejected() {
        let config = DoorlockConfig {
            link: LinkConfig {
                handshake_timeout_ms: Some(0),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
