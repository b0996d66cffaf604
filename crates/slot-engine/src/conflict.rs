//! Detect overlaps between a proposed meeting time and existing busy periods.
//!
//! Adjacent intervals (where one ends exactly when another starts) are NOT conflicts.

use serde::Serialize;

use crate::interval::TimeInterval;

/// A busy period that overlaps a proposed interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub busy: TimeInterval,
    pub overlap_minutes: i64,
}

/// Find every busy period overlapping `proposed`, in the order given.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts(proposed: &TimeInterval, busy: &[TimeInterval]) -> Vec<Conflict> {
    busy.iter()
        .filter(|b| proposed.overlaps(b))
        .map(|b| {
            let overlap_start = proposed.start.max(b.start);
            let overlap_end = proposed.end.min(b.end);
            Conflict {
                busy: *b,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}
