//! `envelope-migrate` — batch re-encryption entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`config::Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Load the cipher configuration and build the registry.
//! 4. Stream NDJSON records from stdin to stdout, failures to the
//!    `FAILURES` file. Logs stay on stderr.

mod config;
mod runner;
mod telemetry;

use std::fs::File;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use envelope::{EnvKeySource, EnvelopeConfig, Migrator};
use tracing::info;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: envelope-migrate configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        skip_current = cfg.skip_current,
        "envelope-migrate starting"
    );

    // -----------------------------------------------------------------------
    // 3. Cipher registry
    // -----------------------------------------------------------------------
    let registry = EnvelopeConfig::from_file(&cfg.envelope_config)
        .with_context(|| format!("failed to load {}", cfg.envelope_config))?
        .build(Arc::new(EnvKeySource))
        .context("invalid cipher configuration")?;
    let migrator = Migrator::new(registry).skip_current(cfg.skip_current);
    let failures = File::create(&cfg.failures)
        .with_context(|| format!("failed to create failure report {}", cfg.failures))?;

    // -----------------------------------------------------------------------
    // 4. Migration
    // -----------------------------------------------------------------------
    let summary = runner::run(
        io::stdin().lock(),
        io::BufWriter::new(io::stdout().lock()),
        io::BufWriter::new(failures),
        &migrator,
    )?;
    info!(
        migrated = summary.migrated,
        current = summary.current,
        failed = summary.failed,
        failures = %cfg.failures,
        "migration finished"
    );

    if summary.failed > 0 {
        anyhow::bail!("{} of {} records failed to migrate", summary.failed, summary.total());
    }
    Ok(())
}
