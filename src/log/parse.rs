use crate::error::AnalysisError;
use crate::log::grammar::{
    GC_STOP_MARKER, GcStopLine, LineGrammar, SAFEPOINT_HEADER_MARKER, SafepointDataLine,
};
use crate::log::row::{GcPauseRecord, SafepointRecord};
use crate::log::timestamp::wall_clock_at;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use std::fs;
use std::path::Path;
use tracing::debug;

fn read_log(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read log file {}", path.display()))
}

/// Parse every stop-the-world line of a GC log, in file order.
pub fn parse_gc_log_file(path: &Path) -> anyhow::Result<Vec<GcPauseRecord>> {
    let text = read_log(path)?;
    let records = parse_gc_log(&text).with_context(|| format!("parse GC log {}", path.display()))?;
    debug!(records = records.len(), file = %path.display(), "parsed GC log");
    Ok(records)
}

pub fn parse_gc_log(text: &str) -> anyhow::Result<Vec<GcPauseRecord>> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if let Some(rec) = GcStopLine
            .parse_line(line)
            .with_context(|| format!("line {}", lineno + 1))?
        {
            out.push(rec);
        }
    }
    Ok(out)
}

/// The first stop-the-world line of a GC log.
///
/// Only the first marker line is considered: if it is truncated the log is
/// treated as having none.
pub fn first_gc_log_line(path: &Path) -> anyhow::Result<GcPauseRecord> {
    let text = read_log(path)?;
    let first = text.lines().find(|l| l.contains(GC_STOP_MARKER));
    let rec = match first {
        Some(line) => GcStopLine
            .parse_line(line)
            .with_context(|| format!("parse GC log {}", path.display()))?,
        None => None,
    };
    rec.ok_or_else(|| AnalysisError::NoStopTheWorldLines(path.to_path_buf()).into())
}

/// Parse a safepoint statistics log, in file order.
///
/// When `start` is given each record also gets its wall-clock time.
pub fn parse_safepoint_log_file(
    path: &Path,
    start: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Vec<SafepointRecord>> {
    let text = read_log(path)?;
    let records = parse_safepoint_log(&text, start)
        .with_context(|| format!("parse safepoint log {}", path.display()))?;
    debug!(records = records.len(), file = %path.display(), "parsed safepoint log");
    Ok(records)
}

pub fn parse_safepoint_log(
    text: &str,
    start: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Vec<SafepointRecord>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();

    let mut idx = 0;
    while idx < lines.len() {
        if !lines[idx].contains(SAFEPOINT_HEADER_MARKER) {
            idx += 1;
            continue;
        }
        // Header consumed together with its data line.
        let data = lines
            .get(idx + 1)
            .with_context(|| format!("safepoint header at line {} has no data line", idx + 1))?;
        let rec = SafepointDataLine
            .parse_line(data)
            .with_context(|| format!("line {}", idx + 2))?;
        if let Some(mut rec) = rec {
            if let Some(start) = start {
                rec.wall_clock_timestamp = Some(
                    wall_clock_at(start, rec.jvm_time_seconds)
                        .with_context(|| format!("line {}", idx + 2))?,
                );
            }
            out.push(rec);
        }
        idx += 2;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::timestamp::parse_gc_timestamp;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const HEADER: &str = "         vmop                    [threads: total initially_running wait_to_block]    [time: spin block sync cleanup vmop] page_trap_count";

    fn stop_line(ts: &str, uptime: f64, stopped: f64, waiting: f64) -> String {
        format!(
            "{ts}: {uptime}: Total time for which application threads were stopped: {stopped} seconds, Stopping threads took: {waiting} seconds"
        )
    }

    fn data_line(time: &str, op: &str, spin: u64, block: u64) -> String {
        format!(
            "{time}: {op}       [      10          0              1    ]      [     {spin}     {block}     3     4     5    ]  0   "
        )
    }

    #[test]
    fn counts_only_complete_stop_lines() {
        let text = [
            "2020-05-27T10:47:52.668+0000: 12.750: [GC (Allocation Failure) 1024K->512K(2048K), 0.0012 secs]".to_string(),
            stop_line("2020-05-27T10:47:52.670+0000", 12.752, 0.01, 0.0),
            "2020-05-27T10:47:53.000+0000: 13.000: Total time for which application threads were stopped:".to_string(),
            stop_line("2020-05-27T10:47:54.000+0000", 14.0, 0.02, 0.001),
        ]
        .join("\n");

        let recs = parse_gc_log(&text).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].jvm_uptime_seconds, 12.752);
        assert_eq!(recs[1].waiting_seconds, 0.001);
    }

    #[test]
    fn first_line_comes_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{}", stop_line("2020-05-27T10:47:52.670+0000", 12.752, 0.01, 0.0)).unwrap();
        writeln!(f, "{}", stop_line("2020-05-27T10:47:54.000+0000", 14.0, 0.02, 0.0)).unwrap();

        let rec = first_gc_log_line(f.path()).unwrap();
        assert_eq!(rec.timestamp, "2020-05-27T10:47:52.670+0000");
        assert_eq!(rec.jvm_uptime_seconds, 12.752);
    }

    #[test]
    fn missing_primary_log_is_an_io_error() {
        let err = parse_gc_log_file(Path::new("/definitely/not/here.log")).unwrap_err();
        assert!(err.to_string().contains("read log file"));
    }

    #[test]
    fn pairs_headers_with_data_lines() {
        let text = [
            HEADER.to_string(),
            data_line("1.000", "RevokeBias", 0, 1),
            "some unrelated line".to_string(),
            HEADER.to_string(),
            data_line("2.500", "G1IncCollectionPause", 2, 7),
            HEADER.to_string(),
            data_line("0.250", "Deoptimize", 1, 0),
        ]
        .join("\n");

        let recs = parse_safepoint_log(&text, None).unwrap();
        let ops: Vec<&str> = recs.iter().map(|r| r.operation_name.as_str()).collect();
        assert_eq!(ops, ["RevokeBias", "G1IncCollectionPause", "Deoptimize"]);
        assert_eq!(recs[1].block_ms, 7);
        assert!(recs.iter().all(|r| r.wall_clock_timestamp.is_none()));
    }

    #[test]
    fn trailing_header_without_data_fails() {
        let text = [HEADER.to_string(), data_line("1.000", "RevokeBias", 0, 1), HEADER.to_string()].join("\n");
        let err = parse_safepoint_log(&text, None).unwrap_err();
        assert!(format!("{:#}", err).contains("no data line"));
    }

    #[test]
    fn wall_clock_applied_when_start_known() {
        let start = parse_gc_timestamp("2020-05-27T10:47:40.670+0000").unwrap();
        let text = [HEADER.to_string(), data_line("2.250", "RevokeBias", 0, 1)].join("\n");

        let recs = parse_safepoint_log(&text, Some(start)).unwrap();
        assert_eq!(
            recs[0].wall_clock_timestamp,
            Some(parse_gc_timestamp("2020-05-27T10:47:42.920+0000").unwrap())
        );
    }

    #[test]
    fn only_the_first_marker_line_counts() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "2020-05-27T10:47:53.000+0000: 13.000: Total time for which application threads were stopped:"
        )
        .unwrap();
        writeln!(f, "{}", stop_line("2020-05-27T10:47:54.000+0000", 14.0, 0.02, 0.0)).unwrap();

        let err = first_gc_log_line(f.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::NoStopTheWorldLines(_))
        ));
    }

    #[test]
    fn stop_line_without_waiting_time_fails() {
        // Fifteen tokens: the waiting time at index 15 is missing.
        let line = "2020-05-27T10:47:52.670+0000: 12.752: Total time for which application threads were stopped: 0.0016530 seconds, Stopping threads took:";
        assert_eq!(line.split(' ').count(), 15);

        let err = parse_gc_log(line).unwrap_err();
        assert!(format!("{:#}", err).contains("no token at index 15"));
    }

    #[test]
    fn out_of_range_safepoint_time_fails() {
        let start = parse_gc_timestamp("2020-05-27T10:47:40.670+0000").unwrap();
        let text = [HEADER.to_string(), data_line("1e20", "RevokeBias", 0, 1)].join("\n");

        let err = parse_safepoint_log(&text, Some(start)).unwrap_err();
        assert!(format!("{:#}", err).contains("out of range"));
        assert!(parse_safepoint_log(&text, None).is_ok());
    }
}
