//! Tests for conflict detection between a proposed time and busy periods.

use chrono::{NaiveDate, NaiveDateTime};
use slot_engine::{find_conflicts, TimeInterval};

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// Helper to create an interval from hour ranges on 2026-03-01.
fn span(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> TimeInterval {
    TimeInterval::new(at(start_hour, start_min), at(end_hour, end_min)).unwrap()
}

#[test]
fn overlapping_busy_period_detected() {
    // Proposed: 09:00-10:00, Busy: 09:30-10:30 → 30-min overlap
    let conflicts = find_conflicts(&span(9, 0, 10, 0), &[span(9, 30, 10, 30)]);

    assert_eq!(conflicts.len(), 1, "should detect exactly one conflict");
    assert_eq!(conflicts[0].overlap_minutes, 30);
    assert_eq!(conflicts[0].busy, span(9, 30, 10, 30));
}

#[test]
fn non_overlapping_busy_period_no_conflict() {
    let conflicts = find_conflicts(&span(9, 0, 10, 0), &[span(11, 0, 12, 0)]);
    assert!(
        conflicts.is_empty(),
        "non-overlapping periods should not be conflicts"
    );
}

#[test]
fn adjacent_busy_periods_not_a_conflict() {
    // Proposed 10:00-11:00 sits exactly between 09:00-10:00 and 11:00-12:00.
    let conflicts = find_conflicts(&span(10, 0, 11, 0), &[span(9, 0, 10, 0), span(11, 0, 12, 0)]);
    assert!(
        conflicts.is_empty(),
        "adjacent periods (end == start) should not be conflicts"
    );
}

#[test]
fn multiple_conflicts_all_found_in_order() {
    // Proposed 09:00-15:00 overlaps both busy periods.
    let busy = vec![span(8, 30, 9, 30), span(14, 30, 15, 30)];

    let conflicts = find_conflicts(&span(9, 0, 15, 0), &busy);

    assert_eq!(conflicts.len(), 2, "should find both conflicts");
    assert_eq!(conflicts[0].overlap_minutes, 30); // 09:00-09:30
    assert_eq!(conflicts[1].overlap_minutes, 30); // 14:30-15:00
}

#[test]
fn fully_contained_busy_period_correct_overlap() {
    // Proposed 09:00-12:00 contains busy 10:00-11:00
    let conflicts = find_conflicts(&span(9, 0, 12, 0), &[span(10, 0, 11, 0)]);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(
        conflicts[0].overlap_minutes, 60,
        "overlap should be the duration of the smaller interval (60 min)"
    );
}

#[test]
fn empty_busy_list_no_conflicts() {
    assert!(find_conflicts(&span(9, 0, 10, 0), &[]).is_empty());
}
