//! GC and safepoint analyses: parse, rank, print, plot.

use crate::error::AnalysisError;
use crate::log::{self, SafepointRecord};
use crate::model::{self, GC_STOPPED, GC_WAITING, KEY, SafepointMetric};
use crate::render::{Figure, Panel, PlotSink, TimeAxis};
use chrono::{DateTime, FixedOffset};
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const GC_FIGURE: &str = "gc_log_analysis";
pub const SAFEPOINT_FIGURE: &str = "safepoint_log_analysis";

const JVM_TIME_LABEL: &str = "Time since JVM start (sec)";

pub fn analyze_gc<W: Write>(
    path: &Path,
    use_timestamps: bool,
    top: usize,
    out: &mut W,
    sink: &dyn PlotSink,
) -> anyhow::Result<()> {
    let mut records = log::parse_gc_log_file(path)?;
    records.sort_by(|a, b| a.jvm_uptime_seconds.total_cmp(&b.jvm_uptime_seconds));
    info!(pauses = records.len(), "analyzing GC log");

    let table = model::gc_table(&records);
    let (Some(max_stopped), Some(max_waiting)) =
        (model::argmax(&table, GC_STOPPED), model::argmax(&table, GC_WAITING))
    else {
        return Err(AnalysisError::NoStopTheWorldLines(path.to_path_buf()).into());
    };

    let row = &records[max_stopped];
    writeln!(out, "Maximum JVM Stopped time: {} for {} sec", row.timestamp, row.stopped_seconds)?;
    let row = &records[max_waiting];
    writeln!(out, "Maximum JVM Waiting to Stop: {} for {} sec", row.timestamp, row.waiting_seconds)?;

    let ranked = model::top_n(&table, GC_STOPPED, top, &records)?;
    writeln!(out, "Top {} STW Times", top)?;
    for row in ranked {
        writeln!(
            out,
            "{} stopped: {}, waiting to stop {}",
            row.timestamp, row.stopped_seconds, row.waiting_seconds
        )?;
    }

    let (axis, xs, x_label): (TimeAxis, Vec<f64>, &str) = if use_timestamps {
        let stamps = records
            .iter()
            .map(|r| log::parse_gc_timestamp(&r.timestamp))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let xs = stamps.iter().map(TimeAxis::x_of).collect();
        (TimeAxis::wall_clock(stamps.first()), xs, "Time")
    } else {
        let xs = table.iter().map(|r| r[KEY]).collect();
        (TimeAxis::JvmSeconds, xs, JVM_TIME_LABEL)
    };

    let panels = [("Threads stopped time", GC_STOPPED), ("Threads waiting to stop time", GC_WAITING)]
        .into_iter()
        .map(|(title, col)| Panel {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: "Time (seconds)".to_string(),
            points: series(&xs, &table, col),
        })
        .collect();

    sink.show(&Figure {
        name: GC_FIGURE.to_string(),
        axis,
        panels,
    })
}

pub fn analyze_safepoint<W: Write>(
    path: &Path,
    top: usize,
    start: Option<DateTime<FixedOffset>>,
    out: &mut W,
    sink: &dyn PlotSink,
) -> anyhow::Result<()> {
    match start {
        Some(start) => writeln!(out, "Start time {}", start)?,
        None => writeln!(out, "Start time None")?,
    }

    let mut records = log::parse_safepoint_log_file(path, start)?;
    records.sort_by(|a, b| a.jvm_time_seconds.total_cmp(&b.jvm_time_seconds));
    info!(safepoints = records.len(), "analyzing safepoint log");

    let table = model::safepoint_table(&records);
    for metric in SafepointMetric::ALL {
        let ranked = model::top_n(&table, metric.column(), top, &records)?;
        writeln!(out, "Top {} entries for {}", top, metric.title())?;
        for rec in ranked {
            writeln!(out, "{}", safepoint_summary(rec))?;
        }
    }

    let (axis, xs): (TimeAxis, Vec<f64>) = match start {
        Some(_) => {
            let xs = records
                .iter()
                .map(|r| r.wall_clock_timestamp.as_ref().map_or(r.jvm_time_seconds, TimeAxis::x_of))
                .collect();
            let first = records.first().and_then(|r| r.wall_clock_timestamp.as_ref());
            (TimeAxis::wall_clock(first), xs)
        }
        None => (TimeAxis::JvmSeconds, table.iter().map(|r| r[KEY]).collect()),
    };

    let panels = SafepointMetric::ALL
        .into_iter()
        .map(|metric| Panel {
            title: metric.title().to_string(),
            x_label: JVM_TIME_LABEL.to_string(),
            y_label: "Time (ms)".to_string(),
            points: series(&xs, &table, metric.column()),
        })
        .collect();

    sink.show(&Figure {
        name: SAFEPOINT_FIGURE.to_string(),
        axis,
        panels,
    })
}

/// One ranked-entry line: operation, reference time, then the six metrics.
pub fn safepoint_summary(rec: &SafepointRecord) -> String {
    let time = match &rec.wall_clock_timestamp {
        Some(ts) => ts.to_string(),
        None => rec.jvm_time_seconds.to_string(),
    };
    format!(
        "Op: {:<29} JVM Time: {:<10}; {}ms {}ms {}ms {}ms {}ms {}ms",
        rec.operation_name,
        time,
        rec.spin_ms,
        rec.block_ms,
        rec.sync_ms,
        rec.cleanup_ms,
        rec.op_ms,
        rec.page_trap_count
    )
}

fn series<const W: usize>(xs: &[f64], table: &[[f64; W]], col: usize) -> Vec<(f64, f64)> {
    xs.iter().copied().zip(table.iter().map(|r| r[col])).collect()
}
