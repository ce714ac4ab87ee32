//! Wall-clock helpers for translating JVM-relative times.
//!
//! GC logs print timestamps like `2020-05-27T10:47:52.668+0000`.

use crate::error::AnalysisError;
use crate::log::parse::first_gc_log_line;
use anyhow::Context;
use chrono::{DateTime, FixedOffset, TimeDelta};
use std::path::Path;
use tracing::debug;

pub const GC_LOG_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

pub fn parse_gc_timestamp(s: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, GC_LOG_DATETIME_FORMAT)
        .with_context(|| format!("bad GC log timestamp {:?}", s))
}

/// JVM start = wall clock of the first stop-the-world line minus its uptime
/// (whole seconds only).
///
/// Returns `None` when no GC log was supplied.
pub fn resolve_jvm_start(gc_log: Option<&Path>) -> anyhow::Result<Option<DateTime<FixedOffset>>> {
    let Some(path) = gc_log else {
        return Ok(None);
    };
    if !path.exists() {
        return Err(AnalysisError::FileDoesNotExist(path.to_path_buf()).into());
    }

    let line = first_gc_log_line(path)?;
    let timestamp = parse_gc_timestamp(&line.timestamp)?;
    let start = TimeDelta::try_seconds(line.jvm_uptime_seconds.trunc() as i64)
        .and_then(|uptime| timestamp.checked_sub_signed(uptime))
        .with_context(|| format!("JVM uptime {} s is out of range", line.jvm_uptime_seconds))?;
    debug!(%start, gc_log = %path.display(), "resolved JVM start");
    Ok(Some(start))
}

/// Translate a JVM-relative time into wall-clock time, truncated to the
/// millisecond.
pub fn wall_clock_at(
    start: DateTime<FixedOffset>,
    jvm_seconds: f64,
) -> anyhow::Result<DateTime<FixedOffset>> {
    let whole = jvm_seconds.trunc() as i64;
    let millis = (jvm_seconds.fract() * 1000.0) as i64;
    TimeDelta::try_seconds(whole)
        .zip(TimeDelta::try_milliseconds(millis))
        .and_then(|(secs, ms)| start.checked_add_signed(secs)?.checked_add_signed(ms))
        .with_context(|| format!("JVM time {} s is out of range", jvm_seconds))
}
