//! Recurring-event expansion into busy intervals.
//!
//! Wraps the `rrule` crate (v0.13) and `chrono-tz` so that a recurring calendar
//! entry (RFC 5545 RRULE plus optional EXDATEs) becomes the concrete busy periods
//! it occupies inside a query window, in naive local time of the event's zone.

use chrono::{NaiveDateTime, TimeDelta, TimeZone};
use rrule::RRuleSet;

use crate::error::SourceError;
use crate::interval::TimeInterval;
use crate::zone;

/// Upper bound on instances returned for a single window.
const MAX_INSTANCES: u16 = 500;

const ICAL_DATETIME: &str = "%Y%m%dT%H%M%S";

/// Expand `rrule` starting at `dtstart` into busy intervals overlapping `window`.
///
/// # Arguments
/// - `rrule` -- RFC 5545 RRULE value (e.g., "FREQ=WEEKLY;BYDAY=TU,TH")
/// - `dtstart` -- first occurrence, naive local time in `timezone`
/// - `duration_minutes` -- length of each occurrence
/// - `timezone` -- IANA timezone (e.g., "America/Los_Angeles")
/// - `window` -- only occurrences overlapping this window are returned
/// - `exdates` -- excluded occurrence starts, same zone as `dtstart`
///
/// Only instances starting in `[window.start - duration, window.end]` are
/// collected, so a long-running series contributes its occurrences in the
/// window no matter how many came before. When the rule carries neither COUNT
/// nor UNTIL, UNTIL is pinned to the window end so that open-ended rules stay
/// bounded.
///
/// # Errors
/// Returns `SourceError::InvalidRule` if the RRULE string is empty or unparseable.
/// Returns `SourceError::InvalidTimezone` if the timezone is not a valid IANA identifier.
pub fn expand_busy(
    rrule: &str,
    dtstart: NaiveDateTime,
    duration_minutes: i64,
    timezone: &str,
    window: &TimeInterval,
    exdates: &[NaiveDateTime],
) -> Result<Vec<TimeInterval>, SourceError> {
    if rrule.trim().is_empty() {
        return Err(SourceError::InvalidRule("empty RRULE string".to_string()));
    }

    let tz: chrono_tz::Tz = timezone
        .parse()
        .map_err(|_| SourceError::InvalidTimezone(timezone.to_string()))?;

    if dtstart >= window.end {
        return Ok(Vec::new());
    }

    let mut rule = rrule.trim().trim_start_matches("RRULE:").to_string();
    let upper = rule.to_uppercase();
    if !upper.contains("COUNT=") && !upper.contains("UNTIL=") {
        // The rrule crate requires UNTIL and DTSTART to share a zone; UTC needs "Z".
        let mut until = window.end.format(ICAL_DATETIME).to_string();
        if timezone == "UTC" {
            until.push('Z');
        }
        rule = format!("{};UNTIL={}", rule, until);
    }

    let mut text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        timezone,
        dtstart.format(ICAL_DATETIME),
        rule
    );
    if !exdates.is_empty() {
        let formatted: Vec<String> = exdates
            .iter()
            .map(|d| d.format(ICAL_DATETIME).to_string())
            .collect();
        text.push_str(&format!("\nEXDATE;TZID={}:{}", timezone, formatted.join(",")));
    }

    let duration = TimeDelta::try_minutes(duration_minutes)
        .ok_or_else(|| SourceError::InvalidRule(format!("duration {duration_minutes} out of range")))?;

    // Anything starting earlier than this ends before the window opens.
    let earliest = window.start.checked_sub_signed(duration).unwrap_or(window.start);
    let rule_tz = rrule::Tz::from(tz);
    let instant = |naive: NaiveDateTime| {
        rule_tz.from_utc_datetime(&zone::convert(naive, tz, chrono_tz::UTC))
    };

    let rule_set: RRuleSet = text
        .parse::<RRuleSet>()
        .map_err(|e| SourceError::InvalidRule(format!("{}", e)))?
        .after(instant(earliest))
        .before(instant(window.end));

    let busy = rule_set
        .all(MAX_INSTANCES)
        .dates
        .into_iter()
        .filter_map(|dt| {
            let start = dt.with_timezone(&tz).naive_local();
            let end = start.checked_add_signed(duration)?;
            Some(TimeInterval { start, end })
        })
        .filter(|b| b.overlaps(window))
        .collect();

    Ok(busy)
}
