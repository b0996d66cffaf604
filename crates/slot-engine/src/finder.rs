//! Free-slot finder: subtract busy intervals from a window and propose meeting times.
//!
//! A single left-to-right cursor sweep over the busy list. Each gap that can hold
//! the requested duration yields exactly one candidate, anchored at the start of
//! the gap. Free time later in the same gap is not enumerated.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SlotError};
use crate::interval::TimeInterval;
use crate::preference::Preference;

/// Score for a slot that ends before a busy period begins.
pub const GAP_SCORE: u8 = 90;
/// Score for the single slot after the last busy period.
pub const TRAILING_SCORE: u8 = 85;

pub const GAP_RATIONALE: &str = "free slot before busy period";
pub const TRAILING_RATIONALE: &str = "end-of-window slot";

/// A proposed meeting time of exactly the requested duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Desirability, higher is better.
    pub score: u8,
    pub rationale: String,
}

impl CandidateSlot {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }
}

/// A complete slot query: what to look for, where, and how many to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub window: TimeInterval,
    pub duration_minutes: i64,
    pub preference: Preference,
    /// Maximum number of candidates returned after filtering.
    pub limit: usize,
}

/// Find candidate slots of `duration_minutes` inside `[window_start, window_end)`.
///
/// Busy intervals may arrive in any order; they are stably sorted by start before
/// the sweep. Intervals outside the window are ignored and the rest are clipped
/// to it, so no candidate extends past `window_end`.
///
/// An empty result is not an error.
///
/// # Errors
/// - [`SlotError::InvalidDuration`] if `duration_minutes <= 0` (or too large to represent).
/// - [`SlotError::InvalidWindow`] if `window_end < window_start`.
/// - [`SlotError::InvalidInterval`] if any busy interval ends before it starts.
pub fn find_slots(
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    busy: &[TimeInterval],
    duration_minutes: i64,
) -> Result<Vec<CandidateSlot>> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidDuration(duration_minutes));
    }
    let duration = TimeDelta::try_minutes(duration_minutes)
        .ok_or(SlotError::InvalidDuration(duration_minutes))?;
    if window_end < window_start {
        return Err(SlotError::InvalidWindow {
            start: window_start,
            end: window_end,
        });
    }
    for interval in busy {
        interval.validate()?;
    }

    let window = TimeInterval {
        start: window_start,
        end: window_end,
    };
    let mut intervals: Vec<TimeInterval> =
        busy.iter().filter_map(|b| b.clip_to(&window)).collect();
    intervals.sort_by_key(|b| b.start);

    let mut slots = Vec::new();
    let mut cursor = window_start;

    for busy_period in &intervals {
        if busy_period.start - cursor >= duration {
            slots.push(CandidateSlot {
                start: cursor,
                end: cursor + duration,
                score: GAP_SCORE,
                rationale: GAP_RATIONALE.to_string(),
            });
        }
        // max() keeps the cursor from moving backwards on nested busy periods.
        cursor = cursor.max(busy_period.end);
    }

    if window_end - cursor >= duration {
        slots.push(CandidateSlot {
            start: cursor,
            end: cursor + duration,
            score: TRAILING_SCORE,
            rationale: TRAILING_RATIONALE.to_string(),
        });
    }

    debug!(
        busy = busy.len(),
        in_window = intervals.len(),
        candidates = slots.len(),
        duration_minutes,
        "slot sweep finished"
    );

    Ok(slots)
}

/// Run [`find_slots`] for `request`, apply its preference and truncate to its limit.
pub fn find_slots_for(request: &SlotRequest, busy: &[TimeInterval]) -> Result<Vec<CandidateSlot>> {
    let mut slots = find_slots(
        request.window.start,
        request.window.end,
        busy,
        request.duration_minutes,
    )?;
    request.preference.retain(&mut slots);
    slots.truncate(request.limit);
    Ok(slots)
}
