//! Numeric tables built from parsed records, plus maxima and top-N ranking.
//!
//! Column 0 of every table is the time key (JVM uptime). Ranking returns the
//! human-readable record rows, looked up through that key.

use crate::error::AnalysisError;
use crate::log::{GcPauseRecord, SafepointRecord};
use anyhow::Context;
use std::cmp::Ordering;

pub const KEY: usize = 0;

pub const GC_STOPPED: usize = 1;
pub const GC_WAITING: usize = 2;

/// (uptime, stopped, waiting) per pause.
pub fn gc_table(records: &[GcPauseRecord]) -> Vec<[f64; 3]> {
    records
        .iter()
        .map(|r| [r.jvm_uptime_seconds, r.stopped_seconds, r.waiting_seconds])
        .collect()
}

/// Safepoint metrics, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafepointMetric {
    Spin,
    Block,
    Sync,
    Cleanup,
    Op,
    PageTrap,
}

impl SafepointMetric {
    pub const ALL: [SafepointMetric; 6] = [
        SafepointMetric::Spin,
        SafepointMetric::Block,
        SafepointMetric::Sync,
        SafepointMetric::Cleanup,
        SafepointMetric::Op,
        SafepointMetric::PageTrap,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SafepointMetric::Spin => "Spin Time",
            SafepointMetric::Block => "Block Time",
            SafepointMetric::Sync => "Sync Time",
            SafepointMetric::Cleanup => "Cleanup Time",
            SafepointMetric::Op => "Op Time",
            SafepointMetric::PageTrap => "Page Trap Time",
        }
    }

    pub fn column(self) -> usize {
        match self {
            SafepointMetric::Spin => 1,
            SafepointMetric::Block => 2,
            SafepointMetric::Sync => 3,
            SafepointMetric::Cleanup => 4,
            SafepointMetric::Op => 5,
            SafepointMetric::PageTrap => 6,
        }
    }
}

/// (time, spin, block, sync, cleanup, op, page traps) per safepoint.
pub fn safepoint_table(records: &[SafepointRecord]) -> Vec<[f64; 7]> {
    records
        .iter()
        .map(|r| {
            [
                r.jvm_time_seconds,
                r.spin_ms as f64,
                r.block_ms as f64,
                r.sync_ms as f64,
                r.cleanup_ms as f64,
                r.op_ms as f64,
                r.page_trap_count as f64,
            ]
        })
        .collect()
}

/// Row index of the largest value in `col`; the first one wins on ties.
pub fn argmax<const W: usize>(table: &[[f64; W]], col: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, row) in table.iter().enumerate() {
        match best {
            Some(b) if table[b][col] >= row[col] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// The `n` raw rows with the largest values in `col`, largest first.
///
/// Rows are found again by their key (column 0) value: when several rows
/// share a key, the first one in `table` order is returned, even if a later
/// row produced the ranked value.
pub fn top_n<'r, R, const W: usize>(
    table: &[[f64; W]],
    col: usize,
    n: usize,
    raw: &'r [R],
) -> anyhow::Result<Vec<&'r R>> {
    if n > table.len() {
        return Err(AnalysisError::TopNOutOfBounds {
            requested: n,
            available: table.len(),
        }
        .into());
    }

    let mut ranked: Vec<[f64; W]> = table.to_vec();
    ranked.sort_by(|a, b| b[col].partial_cmp(&a[col]).unwrap_or(Ordering::Equal));

    let mut out = Vec::with_capacity(n);
    for row in &ranked[..n] {
        let key = row[KEY];
        let pos = table
            .iter()
            .position(|r| r[KEY] == key)
            .with_context(|| format!("key {} vanished from table", key))?;
        let raw_row = raw
            .get(pos)
            .with_context(|| format!("no raw row at index {} ({} raw rows)", pos, raw.len()))?;
        out.push(raw_row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> Vec<[f64; 3]> {
        vec![
            [1.1, 0.02, 0.0],
            [5.2, 0.01, 0.0],
            [9.9, 0.5, 0.1],
            [12.0, 0.3, 0.05],
        ]
    }

    #[test]
    fn argmax_picks_first_largest() {
        let t = vec![[1.0, 3.0], [2.0, 7.0], [3.0, 7.0]];
        assert_eq!(argmax(&t, 1), Some(1));
        assert_eq!(argmax::<2>(&[], 1), None);
    }

    #[test]
    fn top_n_matches_a_manual_descending_sort() {
        let t = table();
        let raw: Vec<usize> = (0..t.len()).collect();

        for n in 0..=t.len() {
            let got: Vec<usize> = top_n(&t, GC_STOPPED, n, &raw).unwrap().into_iter().copied().collect();

            let mut manual = raw.clone();
            manual.sort_by(|&a, &b| t[b][GC_STOPPED].partial_cmp(&t[a][GC_STOPPED]).unwrap());
            manual.truncate(n);
            assert_eq!(got, manual, "n = {n}");
        }
    }

    #[test]
    fn top_n_larger_than_table_is_out_of_bounds() {
        let t = table();
        let raw = vec![(); t.len()];
        let err = top_n(&t, GC_STOPPED, 5, &raw).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::TopNOutOfBounds { requested: 5, available: 4 })
        ));
    }

    #[test]
    fn duplicate_keys_resolve_to_first_row() {
        // Both rows carry key 3.0; the larger stopped value belongs to the
        // second, but the lookup lands on the first.
        let t = vec![[3.0, 0.1, 0.0], [3.0, 0.9, 0.0], [4.0, 0.2, 0.0]];
        let raw = ["first", "second", "third"];
        let got = top_n(&t, GC_STOPPED, 1, &raw).unwrap();
        assert_eq!(got, [&"first"]);
    }

    #[test]
    fn tied_ranking_values_keep_both_rows() {
        let t = vec![[1.0, 0.5, 0.0], [2.0, 0.5, 0.0], [3.0, 0.1, 0.0]];
        let raw = ["a", "b", "c"];
        let mut got = top_n(&t, GC_STOPPED, 2, &raw).unwrap();
        got.sort();
        assert_eq!(got, [&"a", &"b"]);
    }

    #[test]
    fn safepoint_metrics_cover_columns_one_through_six() {
        let cols: Vec<usize> = SafepointMetric::ALL.iter().map(|m| m.column()).collect();
        assert_eq!(cols, [1, 2, 3, 4, 5, 6]);
        assert_eq!(SafepointMetric::PageTrap.title(), "Page Trap Time");
    }
}
