//! Loading the TOML configuration and applying command-line overrides.

use crate::cli::{Cli, NodeCommand};
use anyhow::{Context, Result, ensure};
use doorlock_core::DoorlockConfig;
use std::path::Path;
use tracing::debug;

/// Read and validate a configuration file. Missing sections take defaults.
pub async fn load(path: &Path) -> Result<DoorlockConfig> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse(&text).with_context(|| format!("invalid config file {}", path.display()))?;
    debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse(text: &str) -> Result<DoorlockConfig> {
    let config: DoorlockConfig = toml::from_str(text).context("failed to parse TOML")?;
    config.validate()?;
    Ok(config)
}

/// The configuration for this invocation: file (or defaults) plus flags.
pub async fn resolve(cli: &Cli) -> Result<DoorlockConfig> {
    let mut config = match &cli.config {
        Some(path) => load(path).await?,
        None => DoorlockConfig::default(),
    };

    if let Some(ms) = cli.handshake_timeout_ms {
        config.link.handshake_timeout_ms = Some(ms);
    }

    match &cli.command {
        NodeCommand::Guard {
            eeprom: Some(path), ..
        } => config.storage.eeprom_path = Some(path.clone()),
        NodeCommand::Simulate { time_scale, eeprom } => {
            ensure!(*time_scale > 0, "--time-scale must be at least 1");
            config.timing.cpu_frequency_hz = config
                .timing
                .cpu_frequency_hz
                .checked_mul(*time_scale)
                .context("--time-scale is too large")?;
            if let Some(path) = eeprom {
                config.storage.eeprom_path = Some(path.clone());
            }
        }
        _ => {}
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), DoorlockConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse(
            r#"
            [timing]
            long_compare_value = 40000

            [interface]
            notice_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.timing.long_compare_value, 40000);
        assert_eq!(config.timing.prescaler, 1024);
        assert_eq!(config.interface.notice(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse("[timing]\nprescaler = 0\n").unwrap_err();
        assert!(format!("{err:#}").contains("prescaler"));

        assert!(parse("[storage]\npassword_base_address = 4096\n").is_err());
        assert!(parse("[timing\n").is_err());
    }

    #[tokio::test]
    async fn test_time_scale_speeds_up_timer() {
        let cli = Cli::try_parse_from(["doorlock", "simulate", "--time-scale", "10"]).unwrap();
        let config = resolve(&cli).await.unwrap();

        assert_eq!(config.timing.cpu_frequency_hz, 80_000_000);
        assert_eq!(config.timing.long_period(), Duration::from_micros(750_003));
    }

    #[tokio::test]
    async fn test_flags_override_file() {
        let cli = Cli::try_parse_from([
            "doorlock",
            "guard",
            "--eeprom",
            "/tmp/guard.eeprom",
            "--handshake-timeout-ms",
            "500",
        ])
        .unwrap();
        let config = resolve(&cli).await.unwrap();

        assert_eq!(
            config.storage.eeprom_path.as_deref(),
            Some(Path::new("/tmp/guard.eeprom"))
        );
        assert_eq!(config.link.handshake_timeout(), Some(Duration::from_millis(500)));
    }

    #[tokio::test]
    async fn test_zero_time_scale_rejected() {
        let cli = Cli::try_parse_from(["doorlock", "simulate", "--time-scale", "0"]).unwrap();
        assert!(resolve(&cli).await.is_err());
    }
}
