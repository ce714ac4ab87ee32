//! Log parsing for JVM GC and safepoint statistics output.

pub mod grammar;
pub mod parse;
pub mod row;
pub mod timestamp;

pub use parse::{parse_gc_log_file, parse_safepoint_log_file};
pub use row::{GcPauseRecord, SafepointRecord};
pub use timestamp::{parse_gc_timestamp, resolve_jvm_start};
