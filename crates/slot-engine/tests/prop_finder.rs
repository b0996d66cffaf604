//! Property-based tests for the slot finder using proptest.
//!
//! These verify invariants that should hold for *any* busy list, window and
//! duration, not just the specific scenarios in `finder_tests.rs`.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use proptest::prelude::*;
use slot_engine::{find_slots, find_slots_for, Preference, SlotRequest, TimeInterval};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 16)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn minute(offset: i64) -> NaiveDateTime {
    base() + TimeDelta::minutes(offset)
}

/// A busy interval somewhere in the day, 0-180 minutes long.
fn arb_busy() -> impl Strategy<Value = TimeInterval> {
    (0i64..1440, 0i64..=180).prop_map(|(start, len)| TimeInterval {
        start: minute(start),
        end: minute(start + len),
    })
}

fn arb_busy_list() -> impl Strategy<Value = Vec<TimeInterval>> {
    prop::collection::vec(arb_busy(), 0..12)
}

/// A window `[start, end)` inside the day.
fn arb_window() -> impl Strategy<Value = (i64, i64)> {
    (0i64..1440, 0i64..=960).prop_map(|(start, len)| (start, start + len))
}

fn arb_duration() -> impl Strategy<Value = i64> {
    1i64..=240
}

fn arb_preference() -> impl Strategy<Value = Preference> {
    prop_oneof![
        Just(Preference::Any),
        Just(Preference::Morning),
        Just(Preference::Afternoon),
    ]
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn every_slot_has_exact_duration(
        busy in arb_busy_list(),
        (ws, we) in arb_window(),
        duration in arb_duration(),
    ) {
        let slots = find_slots(minute(ws), minute(we), &busy, duration).unwrap();
        for slot in &slots {
            prop_assert_eq!(slot.end - slot.start, TimeDelta::minutes(duration));
        }
    }

    #[test]
    fn slots_are_chronological_and_disjoint(
        busy in arb_busy_list(),
        (ws, we) in arb_window(),
        duration in arb_duration(),
    ) {
        let slots = find_slots(minute(ws), minute(we), &busy, duration).unwrap();
        for pair in slots.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn slots_stay_in_window_and_avoid_busy_time(
        busy in arb_busy_list(),
        (ws, we) in arb_window(),
        duration in arb_duration(),
    ) {
        let slots = find_slots(minute(ws), minute(we), &busy, duration).unwrap();
        for slot in &slots {
            prop_assert!(slot.start >= minute(ws));
            prop_assert!(slot.end <= minute(we));
            for b in &busy {
                prop_assert!(!slot.interval().overlaps(b), "{:?} overlaps busy {:?}", slot, b);
            }
        }
    }

    #[test]
    fn empty_busy_list_gives_one_slot_iff_window_fits(
        (ws, we) in arb_window(),
        duration in arb_duration(),
    ) {
        let slots = find_slots(minute(ws), minute(we), &[], duration).unwrap();
        let expected = usize::from(we - ws >= duration);
        prop_assert_eq!(slots.len(), expected);
    }

    #[test]
    fn contiguous_busy_cover_gives_no_slots(
        (ws, we) in arb_window(),
        cuts in prop::collection::vec(0i64..=960, 0..6),
        duration in arb_duration(),
    ) {
        // Split the window at arbitrary points and mark every piece busy.
        let mut points: Vec<i64> = cuts.into_iter().map(|c| ws + c.min(we - ws)).collect();
        points.push(ws);
        points.push(we);
        points.sort_unstable();
        let busy: Vec<TimeInterval> = points
            .windows(2)
            .map(|p| TimeInterval { start: minute(p[0]), end: minute(p[1]) })
            .collect();

        let slots = find_slots(minute(ws), minute(we), &busy, duration).unwrap();
        prop_assert!(slots.is_empty());
    }

    #[test]
    fn input_order_does_not_matter(
        busy in arb_busy_list(),
        (ws, we) in arb_window(),
        duration in arb_duration(),
    ) {
        let mut reversed = busy.clone();
        reversed.reverse();
        prop_assert_eq!(
            find_slots(minute(ws), minute(we), &busy, duration).unwrap(),
            find_slots(minute(ws), minute(we), &reversed, duration).unwrap()
        );
    }

    #[test]
    fn repeated_calls_are_identical(
        busy in arb_busy_list(),
        (ws, we) in arb_window(),
        duration in arb_duration(),
    ) {
        let first = find_slots(minute(ws), minute(we), &busy, duration);
        let second = find_slots(minute(ws), minute(we), &busy, duration);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn preference_bounds_hold(
        busy in arb_busy_list(),
        (ws, we) in arb_window(),
        duration in arb_duration(),
        preference in arb_preference(),
        limit in 0usize..6,
    ) {
        let request = SlotRequest {
            window: TimeInterval { start: minute(ws), end: minute(we) },
            duration_minutes: duration,
            preference,
            limit,
        };
        let slots = find_slots_for(&request, &busy).unwrap();
        prop_assert!(slots.len() <= limit);
        for slot in &slots {
            let hour = slot.start.hour();
            match preference {
                Preference::Morning => prop_assert!(hour < 12),
                Preference::Afternoon => prop_assert!((12..17).contains(&hour)),
                Preference::Any => {}
            }
        }
    }
}
