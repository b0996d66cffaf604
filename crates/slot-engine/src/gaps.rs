//! Merge busy periods and compute the maximal free gaps within a window.
//!
//! Unlike [`crate::finder`], which proposes one fixed-length meeting per gap,
//! this reports whole free intervals. Calendar analysis uses it to total up
//! free time.

use crate::interval::TimeInterval;

/// Merge overlapping or adjacent busy periods, clipped to the given window.
///
/// Returns a sorted, non-overlapping list of intervals.
pub fn merge_busy(busy: &[TimeInterval], window: &TimeInterval) -> Vec<TimeInterval> {
    let mut intervals: Vec<TimeInterval> =
        busy.iter().filter_map(|b| b.clip_to(window)).collect();

    if intervals.is_empty() {
        return Vec::new();
    }

    intervals.sort_by_key(|b| (b.start, b.end));

    let mut merged: Vec<TimeInterval> = Vec::new();
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Free intervals of `window` not covered by any busy period, sorted by start.
pub fn free_gaps(busy: &[TimeInterval], window: &TimeInterval) -> Vec<TimeInterval> {
    let mut gaps = Vec::new();
    let mut cursor = window.start;

    for period in merge_busy(busy, window) {
        if cursor < period.start {
            gaps.push(TimeInterval {
                start: cursor,
                end: period.start,
            });
        }
        cursor = cursor.max(period.end);
    }

    if cursor < window.end {
        gaps.push(TimeInterval {
            start: cursor,
            end: window.end,
        });
    }

    gaps
}

/// Total free minutes inside `window`.
pub fn free_minutes(busy: &[TimeInterval], window: &TimeInterval) -> i64 {
    free_gaps(busy, window)
        .iter()
        .map(TimeInterval::duration_minutes)
        .sum()
}
