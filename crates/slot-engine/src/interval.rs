//! Half-open time intervals in naive local time.
//!
//! Every interval handled by the engine is `[start, end)` in one implicit time
//! zone. Callers normalize to that zone first (see [`crate::ical`] and
//! [`crate::config::SchedulerConfig::timezone`]).

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// A half-open time range `[start, end)`. Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    /// Build an interval, rejecting `end < start`. Zero-length intervals are allowed.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    /// Check the `start <= end` invariant.
    ///
    /// Intervals built through struct literals or deserialization bypass [`TimeInterval::new`],
    /// so the finder re-checks every busy entry with this before sweeping.
    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(SlotError::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
    /// Adjacent intervals (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `instant` falls inside `[start, end)`.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Intersect with `window`, or `None` when the two do not overlap.
    pub fn clip_to(&self, window: &TimeInterval) -> Option<TimeInterval> {
        if !self.overlaps(window) {
            return None;
        }
        Some(TimeInterval {
            start: self.start.max(window.start),
            end: self.end.min(window.end),
        })
    }
}
