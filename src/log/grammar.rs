//! Positional line grammars for the JVM log formats we understand.
//!
//! Both formats are whitespace-separated with fixed token offsets, so each
//! grammar owns its offsets and nothing else in the crate indexes tokens.
//!
//! GC (`-XX:+PrintGCApplicationStoppedTime` with date stamps):
//! 2020-05-27T10:47:52.670+0000: 12.752: Total time for which application threads were stopped: 0.0016530 seconds, Stopping threads took: 0.0000410 seconds
//!
//! Safepoint (`-XX:+PrintSafepointStatistics`), header then data:
//!          vmop                    [threads: total initially_running wait_to_block]    [time: spin block sync cleanup vmop] page_trap_count
//! 0.234: ParallelGCFailedAllocation       [      10          0              0    ]      [     0     0     0     0     4    ]  0

use crate::error::AnalysisError;
use crate::log::row::{GcPauseRecord, SafepointRecord};
use anyhow::Context;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::warn;

pub const GC_STOP_MARKER: &str = "Total time for which application threads were stopped";
pub const SAFEPOINT_HEADER_MARKER: &str = "threads: total initially_running wait_to_block";

/// Lines shorter than this are considered truncated.
pub const MIN_TOKENS: usize = 15;

static RUN_OF_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// A single-line record grammar.
///
/// `Ok(None)` means "not a line for this grammar"; `Err` means the line was
/// ours but its fields did not parse.
pub trait LineGrammar {
    type Record;

    fn parse_line(&self, line: &str) -> anyhow::Result<Option<Self::Record>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GcStopLine;

impl GcStopLine {
    const TIMESTAMP: usize = 0;
    const UPTIME: usize = 1;
    const STOPPED: usize = 10;
    const WAITING: usize = 15;
}

impl LineGrammar for GcStopLine {
    type Record = GcPauseRecord;

    fn parse_line(&self, line: &str) -> anyhow::Result<Option<GcPauseRecord>> {
        if !line.contains(GC_STOP_MARKER) {
            return Ok(None);
        }
        let tokens: Vec<&str> = line.split(' ').collect();
        if tokens.len() < MIN_TOKENS {
            return Ok(None);
        }

        Ok(Some(GcPauseRecord {
            timestamp: strip_last_char(token(&tokens, Self::TIMESTAMP)?).to_string(),
            jvm_uptime_seconds: parse_field(strip_last_char(token(&tokens, Self::UPTIME)?), "uptime")?,
            stopped_seconds: parse_field(token(&tokens, Self::STOPPED)?, "stopped time")?,
            waiting_seconds: parse_field(token(&tokens, Self::WAITING)?, "waiting time")?,
        }))
    }
}

/// Grammar for the data line that follows a safepoint statistics header.
///
/// The caller is responsible for pairing: every line handed in is treated as
/// data.
#[derive(Debug, Default, Clone, Copy)]
pub struct SafepointDataLine;

impl SafepointDataLine {
    const TIME: usize = 0;
    const OPERATION: usize = 1;
    const TOTAL: usize = 3;
    const INITIALLY_RUNNING: usize = 4;
    const WAIT_TO_BLOCK: usize = 5;
    const SPIN: usize = 8;
    const BLOCK: usize = 9;
    const SYNC: usize = 10;
    const CLEANUP: usize = 11;
    const VMOP: usize = 12;
    const PAGE_TRAP: usize = 14;
}

impl LineGrammar for SafepointDataLine {
    type Record = SafepointRecord;

    fn parse_line(&self, line: &str) -> anyhow::Result<Option<SafepointRecord>> {
        let mut tokens = tokenize_safepoint_line(line);
        if tokens.len() < MIN_TOKENS {
            warn!(?tokens, "found possible bad line");
            repair_overflowed_tokens(&mut tokens);
        }
        if tokens.len() < MIN_TOKENS {
            return Err(AnalysisError::MalformedSafepointLine {
                line: line.trim().to_string(),
                tokens: tokens.len(),
            }
            .into());
        }

        let int = |idx: usize, field: &str| -> anyhow::Result<u64> { parse_field(&tokens[idx], field) };
        Ok(Some(SafepointRecord {
            jvm_time_seconds: parse_field(strip_last_char(&tokens[Self::TIME]), "time")?,
            operation_name: tokens[Self::OPERATION].clone(),
            total_threads: int(Self::TOTAL, "total")?,
            initially_running: int(Self::INITIALLY_RUNNING, "initially_running")?,
            wait_to_block: int(Self::WAIT_TO_BLOCK, "wait_to_block")?,
            spin_ms: int(Self::SPIN, "spin")?,
            block_ms: int(Self::BLOCK, "block")?,
            sync_ms: int(Self::SYNC, "sync")?,
            cleanup_ms: int(Self::CLEANUP, "cleanup")?,
            op_ms: int(Self::VMOP, "vmop")?,
            page_trap_count: int(Self::PAGE_TRAP, "page_trap_count")?,
            wall_clock_timestamp: None,
        }))
    }
}

/// Collapse runs of spaces and glue "no vm operation" into one token so the
/// column offsets hold.
pub fn tokenize_safepoint_line(line: &str) -> Vec<String> {
    let collapsed = RUN_OF_SPACES.replace_all(line.trim(), " ");
    collapsed
        .replace("no vm operation", "no-vm-operation")
        .split(' ')
        .map(str::to_string)
        .collect()
}

/// Best-effort repair for counters that overflowed into their neighbour,
/// e.g. `0123` which really is `0` followed by `123`.
///
/// Each integer-looking token with a leading zero is split after its first
/// character. The remainder is examined again, so `0012` becomes `0 0 12`.
pub fn repair_overflowed_tokens(tokens: &mut Vec<String>) {
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.starts_with('0') && tok.len() > 1 && !tok.contains('.') {
            let rest = tok[1..].to_string();
            tokens[i].truncate(1);
            tokens.insert(i + 1, rest);
        }
        i += 1;
    }
}

fn token<'a>(tokens: &[&'a str], idx: usize) -> anyhow::Result<&'a str> {
    tokens
        .get(idx)
        .copied()
        .with_context(|| format!("line has {} tokens, no token at index {}", tokens.len(), idx))
}

fn strip_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str()
}

fn parse_field<T>(s: &str, field: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse::<T>()
        .with_context(|| format!("bad {} value {:?}", field, s))
}
