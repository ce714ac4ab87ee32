use chrono::{DateTime, FixedOffset};

/// One "Total time for which application threads were stopped" line.
#[derive(Debug, Clone, PartialEq)]
pub struct GcPauseRecord {
    /// Raw ISO-8601 timestamp as printed by the JVM (trailing ':' removed).
    pub timestamp: String,
    pub jvm_uptime_seconds: f64,
    pub stopped_seconds: f64,
    pub waiting_seconds: f64,
}

/// One safepoint statistics data row (the line following the column header).
#[derive(Debug, Clone, PartialEq)]
pub struct SafepointRecord {
    pub jvm_time_seconds: f64,
    pub operation_name: String,
    pub total_threads: u64,
    pub initially_running: u64,
    pub wait_to_block: u64,
    pub spin_ms: u64,
    pub block_ms: u64,
    pub sync_ms: u64,
    pub cleanup_ms: u64,
    pub op_ms: u64,
    pub page_trap_count: u64,
    /// Only set when a JVM start timestamp was resolved from a GC log.
    pub wall_clock_timestamp: Option<DateTime<FixedOffset>>,
}
