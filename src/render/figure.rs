use chrono::{DateTime, FixedOffset, Offset, Utc};

/// How x values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeAxis {
    /// Seconds since JVM start.
    JvmSeconds,
    /// Unix seconds, labelled as wall-clock time in the given offset.
    WallClock(FixedOffset),
}

impl TimeAxis {
    /// Axis for a set of wall-clock timestamps; the offset of the first one
    /// is used for labels.
    pub fn wall_clock(first: Option<&DateTime<FixedOffset>>) -> Self {
        let offset = first
            .map(|ts| *ts.offset())
            .unwrap_or_else(|| Utc.fix());
        TimeAxis::WallClock(offset)
    }

    pub fn x_of(ts: &DateTime<FixedOffset>) -> f64 {
        ts.timestamp_millis() as f64 / 1000.0
    }

    pub fn format_tick(&self, x: f64) -> String {
        match self {
            TimeAxis::JvmSeconds => format!("{}", x),
            TimeAxis::WallClock(offset) => {
                let millis = (x * 1000.0).round() as i64;
                match DateTime::from_timestamp_millis(millis) {
                    Some(utc) => utc.with_timezone(offset).format("%m-%d %H:%M:%S%.3f").to_string(),
                    None => format!("{}", x),
                }
            }
        }
    }
}

/// One subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
}

/// A named stack of subplots sharing one x axis kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// File stem of the saved image.
    pub name: String,
    pub axis: TimeAxis,
    pub panels: Vec<Panel>,
}
