//! Calendar backends as seen by the engine.
//!
//! A [`CalendarSource`] hands out events for a window and accepts new or moved
//! events. [`busy_intervals`] reduces those events (expanding recurring ones)
//! to the busy list consumed by [`crate::finder`], and applies the configured
//! [`OutagePolicy`] when the backend cannot be reached.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{OutagePolicy, SchedulerConfig};
use crate::error::{SlotError, SourceError};
use crate::interval::TimeInterval;
use crate::recurrence;
use crate::zone;

/// Recurrence data kept in the event's own zone so DST is applied correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recurrence {
    pub rule: String,
    /// First occurrence, naive local time in `timezone`.
    pub dtstart: NaiveDateTime,
    pub timezone: String,
    /// Excluded occurrence starts, naive local time in `timezone`.
    pub exdates: Vec<NaiveDateTime>,
}

/// A calendar entry with times in the engine's local zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub recurrence: Option<Recurrence>,
}

impl CalendarEvent {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Busy periods this event occupies inside `window`, in the `local` zone.
    pub fn busy_within(
        &self,
        window: &TimeInterval,
        local: chrono_tz::Tz,
    ) -> Result<Vec<TimeInterval>, SourceError> {
        let Some(rec) = &self.recurrence else {
            return Ok(self.interval().clip_to(window).into_iter().collect());
        };

        // Expand in the event's zone over a window padded by a day on each side,
        // then bring each occurrence back to local time and re-check overlap.
        let event_tz = zone::parse_tz(&rec.timezone)?;
        let pad = TimeDelta::days(1);
        let start = zone::convert(window.start, local, event_tz);
        let end = zone::convert(window.end, local, event_tz);
        let zoned_window = TimeInterval {
            start: start.checked_sub_signed(pad).unwrap_or(start),
            end: end.checked_add_signed(pad).unwrap_or(end),
        };
        let occurrences = recurrence::expand_busy(
            &rec.rule,
            rec.dtstart,
            self.duration_minutes(),
            &rec.timezone,
            &zoned_window,
            &rec.exdates,
        )?;

        Ok(occurrences
            .into_iter()
            .filter_map(|occ| {
                let start = zone::convert(occ.start, event_tz, local);
                let end = zone::convert(occ.end, event_tz, local);
                TimeInterval { start, end }.clip_to(window)
            })
            .collect())
    }
}

/// A request to persist a new calendar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub duration_minutes: i64,
}

/// A calendar backend (hosted calendar API or CalDAV endpoint).
pub trait CalendarSource {
    /// Events that overlap `window`. Recurring events are returned once, unexpanded.
    fn events(&self, window: &TimeInterval) -> Result<Vec<CalendarEvent>, SourceError>;

    /// Persist a new event and return it as stored.
    fn create_event(&mut self, event: NewEvent) -> Result<CalendarEvent, SourceError>;

    /// Move event `uid` to `new_start`, keeping its duration and appending `note`
    /// to its description.
    fn move_event(
        &mut self,
        uid: &str,
        new_start: NaiveDateTime,
        note: &str,
    ) -> Result<CalendarEvent, SourceError>;
}

/// An in-process calendar, used for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCalendar {
    events: Vec<CalendarEvent>,
    next_id: u64,
}

impl InMemoryCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events, next_id: 1 }
    }

    /// Load events from iCalendar text, normalizing times into `timezone`.
    pub fn from_ics(ics: &str, timezone: &str) -> Result<Self, SourceError> {
        Ok(Self::new(crate::ical::parse_events(ics, timezone)?))
    }

    pub fn all_events(&self) -> &[CalendarEvent] {
        &self.events
    }
}

impl CalendarSource for InMemoryCalendar {
    fn events(&self, window: &TimeInterval) -> Result<Vec<CalendarEvent>, SourceError> {
        let mut found: Vec<CalendarEvent> = self
            .events
            .iter()
            // Recurring events may occur in the window even when the first one does not.
            .filter(|e| e.recurrence.is_some() || e.interval().overlaps(window))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.start);
        Ok(found)
    }

    fn create_event(&mut self, event: NewEvent) -> Result<CalendarEvent, SourceError> {
        let end = TimeDelta::try_minutes(event.duration_minutes)
            .filter(|_| event.duration_minutes > 0)
            .and_then(|d| event.start.checked_add_signed(d))
            .ok_or(SlotError::InvalidDuration(event.duration_minutes))?;
        let created = CalendarEvent {
            uid: format!("local-{}", self.next_id),
            title: event.title,
            description: event.description,
            start: event.start,
            end,
            recurrence: None,
        };
        self.next_id += 1;
        self.events.push(created.clone());
        Ok(created)
    }

    fn move_event(
        &mut self,
        uid: &str,
        new_start: NaiveDateTime,
        note: &str,
    ) -> Result<CalendarEvent, SourceError> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.uid == uid)
            .ok_or_else(|| SourceError::NotFound(uid.to_string()))?;

        let duration = event.end - event.start;
        let new_end = new_start
            .checked_add_signed(duration)
            .ok_or(SlotError::InvalidDuration(duration.num_minutes()))?;
        event.start = new_start;
        event.end = new_end;
        // A moved occurrence no longer follows its series.
        event.recurrence = None;
        if !note.is_empty() {
            if !event.description.is_empty() {
                event.description.push_str("\n\n");
            }
            event.description.push_str("Rescheduled: ");
            event.description.push_str(note);
        }
        Ok(event.clone())
    }
}

/// One concrete occurrence of an event inside a query window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub uid: String,
    pub title: String,
    #[serde(flatten)]
    pub interval: TimeInterval,
}

/// Every occurrence of the events of `source` inside `window`, sorted by start.
///
/// Recurring events are expanded and all intervals are clipped to the window.
/// When the source is unavailable and the policy is [`OutagePolicy::AssumeFree`],
/// the outage is logged and an empty list is returned. Every other error
/// propagates.
pub fn occurrences<S: CalendarSource + ?Sized>(
    source: &S,
    window: &TimeInterval,
    config: &SchedulerConfig,
) -> Result<Vec<Occurrence>, SourceError> {
    let events = match source.events(window) {
        Ok(events) => events,
        Err(SourceError::Unavailable(reason)) if config.outage_policy == OutagePolicy::AssumeFree => {
            warn!(%reason, "calendar source unavailable, treating window as free");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let local = config.timezone()?;
    let mut found = Vec::new();
    for event in &events {
        for interval in event.busy_within(window, local)? {
            found.push(Occurrence {
                uid: event.uid.clone(),
                title: event.title.clone(),
                interval,
            });
        }
    }
    found.sort_by_key(|o| (o.interval.start, o.interval.end));

    debug!(events = events.len(), occurrences = found.len(), "expanded calendar window");
    Ok(found)
}

/// Reduce the events of `source` inside `window` to a sorted busy list.
///
/// Outage handling follows [`occurrences`].
pub fn busy_intervals<S: CalendarSource + ?Sized>(
    source: &S,
    window: &TimeInterval,
    config: &SchedulerConfig,
) -> Result<Vec<TimeInterval>, SourceError> {
    Ok(occurrences(source, window, config)?
        .into_iter()
        .map(|o| o.interval)
        .collect())
}
