//! Configuration loading and validation for the migration tool.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated migration tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the cipher configuration file (TOML or JSON). **Required.**
    pub envelope_config: String,

    /// Path the per-record failure report is written to, one JSON object
    /// per line. Kept apart from stderr, which carries the JSON logs.
    #[serde(default = "default_failures")]
    pub failures: String,

    /// Re-encrypt only records whose recorded version differs from the
    /// current `version()`.
    #[serde(default = "default_skip_current")]
    pub skip_current: bool,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_failures() -> String {
    "failures.ndjson".into()
}
fn default_skip_current() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build migration configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise migration configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.envelope_config.trim().is_empty() {
            anyhow::bail!("ENVELOPE_CONFIG is required and must not be empty");
        }
        if self.failures.trim().is_empty() {
            anyhow::bail!("FAILURES must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(default_failures(), "failures.ndjson");
        assert!(default_skip_current());
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_rejects_empty_config_path() {
        let cfg = Config {
            envelope_config: "  ".into(),
            failures: default_failures(),
            skip_current: true,
            log_level: "info".into(),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_failures_path() {
        let cfg = Config {
            envelope_config: "/etc/envelope/ciphers.toml".into(),
            failures: "".into(),
            skip_current: true,
            log_level: "info".into(),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_valid_config() {
        let cfg = Config {
            envelope_config: "/etc/envelope/ciphers.toml".into(),
            failures: "/var/log/envelope/failures.ndjson".into(),
            skip_current: false,
            log_level: "debug".into(),
        };
        assert!(cfg.validate().is_ok());
    }
}
