//! Line-by-line migration of newline-delimited JSON records.
//!
//! Every input record produces exactly one output: the migrated record (or the
//! original, when already current) on `out`, or a [`RecordFailure`] on
//! `failures`. Blank lines are skipped. Log events never reach either sink.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use common::protocol::{RecordFailure, StoredRecord};
use envelope::{Migration, MigrationSummary, Migrator};
use tracing::{debug, warn};

/// Migrate every record read from `input`.
///
/// # Errors
///
/// Returns an error only on I/O failure. Per-record failures are reported on
/// `failures` and counted in the returned summary.
pub fn run<R, W, F>(
    input: R,
    mut out: W,
    mut failures: F,
    migrator: &Migrator,
) -> Result<MigrationSummary>
where
    R: BufRead,
    W: Write,
    F: Write,
{
    let mut summary = MigrationSummary::default();

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read input line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: StoredRecord = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line_no, "unparseable input record");
                summary.failed += 1;
                let failure = RecordFailure::new(line_no, "invalid_record", e.to_string());
                write_json(&mut failures, &failure)?;
                continue;
            }
        };

        let outcome = migrator.migrate(&record);
        summary.record(&outcome);
        match outcome {
            Ok(Migration::Migrated(migrated)) => {
                debug!(line = line_no, "record migrated");
                write_json(&mut out, &migrated)?;
            }
            Ok(Migration::Current) => write_json(&mut out, &record)?,
            Err(e) => {
                warn!(line = line_no, code = e.code(), "record migration failed");
                write_json(&mut failures, &RecordFailure::from_envelope(line_no, &e))?;
            }
        }
    }

    out.flush().context("failed to flush output")?;
    failures.flush().context("failed to flush failure report")?;
    Ok(summary)
}

fn write_json<W: Write, T: serde::Serialize>(w: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *w, value).context("failed to serialise record")?;
    w.write_all(b"\n").context("failed to write record")?;
    Ok(())
}
