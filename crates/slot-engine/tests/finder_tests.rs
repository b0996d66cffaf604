//! Tests for the free-slot sweep and its preference/limit post-passes.

use chrono::{NaiveDate, NaiveDateTime};
use slot_engine::finder::{GAP_RATIONALE, GAP_SCORE, TRAILING_RATIONALE, TRAILING_SCORE};
use slot_engine::{find_slots, find_slots_for, Preference, SlotError, SlotRequest, TimeInterval};

/// Helper: 2026-03-16 at `h:m`.
fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 16)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn busy(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
    TimeInterval::new(at(sh, sm), at(eh, em)).unwrap()
}

// ── Reference scenarios ─────────────────────────────────────────────────────

#[test]
fn gap_before_busy_and_trailing_slot() {
    // Window 09:00-17:00, busy 10:00-10:30, 60 minutes
    let slots = find_slots(at(9, 0), at(17, 0), &[busy(10, 0, 10, 30)], 60).unwrap();

    assert_eq!(slots.len(), 2);

    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].end, at(10, 0));
    assert_eq!(slots[0].score, GAP_SCORE);
    assert_eq!(slots[0].rationale, GAP_RATIONALE);

    assert_eq!(slots[1].start, at(10, 30));
    assert_eq!(slots[1].end, at(11, 30));
    assert_eq!(slots[1].score, TRAILING_SCORE);
    assert_eq!(slots[1].rationale, TRAILING_RATIONALE);
}

#[test]
fn empty_busy_list_yields_single_trailing_slot() {
    let slots = find_slots(at(9, 0), at(17, 0), &[], 30).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].end, at(9, 30));
    assert_eq!(slots[0].score, 85);
}

#[test]
fn duration_longer_than_window_yields_nothing() {
    let slots = find_slots(at(9, 0), at(17, 0), &[], 600).unwrap();
    assert!(slots.is_empty());
}

// ── Gap arithmetic ──────────────────────────────────────────────────────────

#[test]
fn gap_of_exactly_the_duration_qualifies() {
    // 09:00-09:45 is free, exactly 45 minutes
    let slots = find_slots(at(9, 0), at(10, 0), &[busy(9, 45, 10, 0)], 45).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].end, at(9, 45));
}

#[test]
fn gap_one_minute_short_does_not_qualify() {
    let slots = find_slots(at(9, 0), at(10, 0), &[busy(9, 44, 10, 0)], 45).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn busy_list_filling_window_yields_nothing() {
    let list = vec![busy(9, 0, 12, 0), busy(12, 0, 15, 0), busy(15, 0, 17, 0)];
    let slots = find_slots(at(9, 0), at(17, 0), &list, 15).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn nested_busy_interval_does_not_rewind_cursor() {
    // 10:00-13:00 contains 11:00-11:30; 11:30-13:00 must not be offered.
    let list = vec![busy(10, 0, 13, 0), busy(11, 0, 11, 30)];
    let slots = find_slots(at(9, 0), at(14, 0), &list, 60).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[1].start, at(13, 0));
    assert_eq!(slots[1].score, TRAILING_SCORE);
}

#[test]
fn zero_length_busy_interval_splits_gap() {
    // 12:00-12:00 blocks nothing but still closes the 09:00 gap.
    let slots = find_slots(at(9, 0), at(17, 0), &[busy(12, 0, 12, 0)], 60).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].score, GAP_SCORE);
    assert_eq!(slots[1].start, at(12, 0));
    assert_eq!(slots[1].score, TRAILING_SCORE);
}

#[test]
fn zero_length_busy_interval_on_window_edge_is_ignored() {
    let edges = vec![busy(9, 0, 9, 0), busy(17, 0, 17, 0)];
    let slots = find_slots(at(9, 0), at(17, 0), &edges, 60).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].score, TRAILING_SCORE);
}

#[test]
fn one_candidate_per_gap_even_when_gap_is_long() {
    // The 10:00-16:00 gap could hold six hour-long meetings; only the first is
    // proposed. This sparse policy is intentional and pinned here.
    let list = vec![busy(9, 0, 10, 0), busy(16, 0, 17, 0)];
    let slots = find_slots(at(9, 0), at(17, 0), &list, 60).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(10, 0));
    assert_eq!(slots[0].end, at(11, 0));
    assert_eq!(slots[0].score, GAP_SCORE);
}

#[test]
fn unsorted_busy_list_is_sorted_before_sweep() {
    let sorted = vec![busy(10, 0, 11, 0), busy(13, 0, 14, 0)];
    let unsorted = vec![busy(13, 0, 14, 0), busy(10, 0, 11, 0)];

    let expected = find_slots(at(9, 0), at(17, 0), &sorted, 60).unwrap();
    let actual = find_slots(at(9, 0), at(17, 0), &unsorted, 60).unwrap();

    assert_eq!(actual, expected);
    assert_eq!(actual.len(), 3);
}

#[test]
fn busy_outside_window_is_ignored() {
    // Ends before the window and starts after it.
    let list = vec![busy(7, 0, 8, 0), busy(18, 0, 19, 0)];
    let slots = find_slots(at(9, 0), at(17, 0), &list, 60).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].score, TRAILING_SCORE);
}

#[test]
fn busy_straddling_window_start_moves_cursor() {
    let slots = find_slots(at(9, 0), at(17, 0), &[busy(8, 0, 9, 30)], 60).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(9, 30));
}

#[test]
fn busy_straddling_window_end_never_yields_slot_past_end() {
    // Busy 16:30-18:00; the gap before it is clipped to the window.
    let slots = find_slots(at(16, 0), at(17, 0), &[busy(16, 30, 18, 0)], 30).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].end, at(16, 30));
}

#[test]
fn empty_window_yields_nothing() {
    let slots = find_slots(at(9, 0), at(9, 0), &[], 1).unwrap();
    assert!(slots.is_empty());
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn zero_and_negative_duration_rejected() {
    assert_eq!(
        find_slots(at(9, 0), at(17, 0), &[], 0),
        Err(SlotError::InvalidDuration(0))
    );
    assert_eq!(
        find_slots(at(9, 0), at(17, 0), &[], -30),
        Err(SlotError::InvalidDuration(-30))
    );
}

#[test]
fn reversed_busy_interval_rejected() {
    let malformed = TimeInterval {
        start: at(11, 0),
        end: at(10, 0),
    };
    let err = find_slots(at(9, 0), at(17, 0), &[busy(9, 0, 9, 30), malformed], 30).unwrap_err();
    assert_eq!(
        err,
        SlotError::InvalidInterval {
            start: at(11, 0),
            end: at(10, 0)
        }
    );
}

#[test]
fn reversed_busy_interval_rejected_even_outside_window() {
    let malformed = TimeInterval {
        start: at(20, 0),
        end: at(19, 0),
    };
    assert!(matches!(
        find_slots(at(9, 0), at(17, 0), &[malformed], 30),
        Err(SlotError::InvalidInterval { .. })
    ));
}

#[test]
fn reversed_window_rejected() {
    assert!(matches!(
        find_slots(at(17, 0), at(9, 0), &[], 30),
        Err(SlotError::InvalidWindow { .. })
    ));
}

// ── Preference and limit ────────────────────────────────────────────────────

fn spread_busy() -> Vec<TimeInterval> {
    // Gaps start at 08:00, 11:00, 13:00, 16:00 and the trailing gap at 18:00.
    vec![
        busy(9, 0, 11, 0),
        busy(12, 0, 13, 0),
        busy(14, 0, 16, 0),
        busy(17, 0, 18, 0),
    ]
}

fn request(preference: Preference, limit: usize) -> SlotRequest {
    SlotRequest {
        window: TimeInterval::new(at(8, 0), at(20, 0)).unwrap(),
        duration_minutes: 60,
        preference,
        limit,
    }
}

#[test]
fn morning_keeps_slots_before_noon() {
    let slots = find_slots_for(&request(Preference::Morning, 10), &spread_busy()).unwrap();
    let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![at(8, 0), at(11, 0)]);
}

#[test]
fn afternoon_keeps_slots_between_noon_and_five() {
    let slots = find_slots_for(&request(Preference::Afternoon, 10), &spread_busy()).unwrap();
    let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![at(13, 0), at(16, 0)]);
}

#[test]
fn any_keeps_everything_up_to_limit() {
    let all = find_slots_for(&request(Preference::Any, 10), &spread_busy()).unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[4].start, at(18, 0));
    assert_eq!(all[4].score, TRAILING_SCORE);

    let capped = find_slots_for(&request(Preference::Any, 3), &spread_busy()).unwrap();
    assert_eq!(capped.len(), 3);
    assert_eq!(capped[..], all[..3]);
}

#[test]
fn limit_applies_after_filtering() {
    // Without filtering first, the limit of 1 would keep the 08:00 morning slot.
    let slots = find_slots_for(&request(Preference::Afternoon, 1), &spread_busy()).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(13, 0));
}

#[test]
fn zero_limit_returns_nothing() {
    let slots = find_slots_for(&request(Preference::Any, 0), &spread_busy()).unwrap();
    assert!(slots.is_empty());
}
