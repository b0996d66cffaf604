//! Minimal iCalendar (RFC 5545) reader for VEVENT components.
//!
//! Only what busy-time computation needs is read: `UID`, `SUMMARY`,
//! `DESCRIPTION`, `DTSTART`, `DTEND`, `DURATION`, `RRULE` and `EXDATE`.
//! Nested components (e.g. `VALARM`) are skipped.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use chrono_tz::Tz;

use crate::error::SourceError;
use crate::source::{CalendarEvent, Recurrence};
use crate::zone;

/// A date-time property value, still in the zone it was written in.
#[derive(Debug, Clone, Copy)]
struct ZonedValue {
    naive: NaiveDateTime,
    zone: Tz,
    all_day: bool,
}

#[derive(Default)]
struct EventBuilder {
    begin_line: usize,
    uid: Option<String>,
    title: Option<String>,
    description: Option<String>,
    start: Option<ZonedValue>,
    end: Option<ZonedValue>,
    duration: Option<TimeDelta>,
    rrule: Option<String>,
    exdates: Vec<ZonedValue>,
}

/// Parse every VEVENT in `ics`, normalizing times into the IANA zone `timezone`.
///
/// Floating times (no `Z`, no `TZID`) and all-day dates are read as local time
/// in `timezone`.
///
/// # Errors
/// `SourceError::Parse` for malformed lines, values, or a VEVENT without DTSTART.
/// `SourceError::InvalidTimezone` for an unknown `timezone` or `TZID`.
pub fn parse_events(ics: &str, timezone: &str) -> Result<Vec<CalendarEvent>, SourceError> {
    let local = zone::parse_tz(timezone)?;
    let mut events = Vec::new();
    let mut current: Option<EventBuilder> = None;
    // Depth of components nested inside the current VEVENT.
    let mut nested = 0usize;

    for (line_no, line) in unfold(ics) {
        if line.is_empty() {
            continue;
        }
        let (name, params, value) = split_property(&line).ok_or_else(|| SourceError::Parse {
            line: line_no,
            message: format!("expected NAME:VALUE, got '{}'", line),
        })?;

        let in_event = current.is_some();
        match name.as_str() {
            "BEGIN" if !in_event => {
                if value.eq_ignore_ascii_case("VEVENT") {
                    current = Some(EventBuilder {
                        begin_line: line_no,
                        ..Default::default()
                    });
                }
                continue;
            }
            "BEGIN" => {
                nested += 1;
                continue;
            }
            "END" if in_event && nested > 0 => {
                nested -= 1;
                continue;
            }
            "END" if in_event && value.eq_ignore_ascii_case("VEVENT") => {
                if let Some(builder) = current.take() {
                    let index = events.len();
                    events.push(builder.finish(local, index)?);
                }
                continue;
            }
            _ if nested > 0 => continue,
            _ => {}
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };
        let at = |message: String| SourceError::Parse {
            line: line_no,
            message,
        };
        match name.as_str() {
            "UID" => builder.uid = Some(value),
            "SUMMARY" => builder.title = Some(unescape(&value)),
            "DESCRIPTION" => builder.description = Some(unescape(&value)),
            "DTSTART" => builder.start = Some(parse_value(&value, &params, local).map_err(at)?),
            "DTEND" => builder.end = Some(parse_value(&value, &params, local).map_err(at)?),
            "DURATION" => builder.duration = Some(parse_duration(&value).map_err(at)?),
            "RRULE" => builder.rrule = Some(value),
            "EXDATE" => {
                for part in value.split(',') {
                    builder
                        .exdates
                        .push(parse_value(part.trim(), &params, local).map_err(at)?);
                }
            }
            _ => {}
        }
    }

    if let Some(builder) = current {
        return Err(SourceError::Parse {
            line: builder.begin_line,
            message: "VEVENT is never closed".to_string(),
        });
    }

    Ok(events)
}

impl EventBuilder {
    fn finish(self, local: Tz, index: usize) -> Result<CalendarEvent, SourceError> {
        let err = |message: &str| SourceError::Parse {
            line: self.begin_line,
            message: message.to_string(),
        };
        let start = self.start.ok_or_else(|| err("VEVENT without DTSTART"))?;

        let end_naive = match (self.end, self.duration) {
            (Some(end), _) => Some(zone::convert(end.naive, end.zone, start.zone)),
            (None, Some(duration)) => start.naive.checked_add_signed(duration),
            (None, None) if start.all_day => start.naive.checked_add_signed(TimeDelta::days(1)),
            (None, None) => Some(start.naive),
        }
        .ok_or_else(|| err("event end is out of range"))?;
        if end_naive < start.naive {
            return Err(err("DTEND is before DTSTART"));
        }

        let recurrence = self.rrule.map(|rule| Recurrence {
            rule,
            dtstart: start.naive,
            timezone: start.zone.name().to_string(),
            exdates: self
                .exdates
                .iter()
                .map(|ex| zone::convert(ex.naive, ex.zone, start.zone))
                .collect(),
        });

        Ok(CalendarEvent {
            uid: self.uid.unwrap_or_else(|| format!("event-{}", index + 1)),
            title: self.title.unwrap_or_else(|| "Untitled".to_string()),
            description: self.description.unwrap_or_default(),
            start: zone::convert(start.naive, start.zone, local),
            end: zone::convert(end_naive, start.zone, local),
            recurrence,
        })
    }
}

/// Join folded continuation lines, yielding each logical line with the 1-based
/// number of its first physical line.
fn unfold(ics: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in ics.lines().enumerate() {
        let raw = raw.trim_end_matches('\r');
        if let Some(rest) = raw.strip_prefix([' ', '\t']) {
            if let Some((_, last)) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push((idx + 1, raw.trim_start().to_string()));
    }
    lines
}

/// Split `NAME;P1=V1;P2=V2:VALUE` into its upper-cased name, parameters and value.
fn split_property(line: &str) -> Option<(String, Vec<(String, String)>, String)> {
    let (head, value) = line.split_once(':')?;
    let mut parts = head.split(';');
    let name = parts.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }
    let params = parts
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.trim().to_ascii_uppercase(), v.trim().trim_matches('"').to_string()))
        .collect();
    Some((name, params, value.trim().to_string()))
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_value(value: &str, params: &[(String, String)], local: Tz) -> Result<ZonedValue, String> {
    let is_date = param(params, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || value.len() == 8;
    if is_date {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d")
            .map_err(|e| format!("invalid date '{}': {}", value, e))?;
        return Ok(ZonedValue {
            naive: date.and_time(chrono::NaiveTime::MIN),
            zone: local,
            all_day: true,
        });
    }

    let (text, zone) = match value.strip_suffix('Z') {
        Some(utc) => (utc, Tz::UTC),
        None => match param(params, "TZID") {
            Some(tzid) => (
                value,
                zone::parse_tz(tzid).map_err(|_| format!("unknown TZID '{}'", tzid))?,
            ),
            None => (value, local),
        },
    };
    let naive = NaiveDateTime::parse_from_str(text, "%Y%m%dT%H%M%S")
        .map_err(|e| format!("invalid date-time '{}': {}", value, e))?;
    Ok(ZonedValue {
        naive,
        zone,
        all_day: false,
    })
}

/// Parse an RFC 5545 duration such as `PT1H30M`, `P1D` or `P2W`.
fn parse_duration(value: &str) -> Result<TimeDelta, String> {
    let bad = || format!("invalid duration '{}'", value);
    let body = value.strip_prefix('+').unwrap_or(value);
    if body.starts_with('-') {
        return Err(format!("negative duration '{}'", value));
    }
    let body = body.strip_prefix('P').ok_or_else(bad)?;

    let mut total = TimeDelta::zero();
    let mut number = String::new();
    let mut in_time = false;
    for ch in body.chars() {
        match ch {
            '0'..='9' => number.push(ch),
            'T' if number.is_empty() => in_time = true,
            unit => {
                let n: i64 = number.parse().map_err(|_| bad())?;
                number.clear();
                let part = match (unit, in_time) {
                    ('W', false) => TimeDelta::try_weeks(n),
                    ('D', false) => TimeDelta::try_days(n),
                    ('H', true) => TimeDelta::try_hours(n),
                    ('M', true) => TimeDelta::try_minutes(n),
                    ('S', true) => TimeDelta::try_seconds(n),
                    _ => return Err(bad()),
                };
                total = part.and_then(|p| total.checked_add(&p)).ok_or_else(bad)?;
            }
        }
    }
    if !number.is_empty() {
        return Err(bad());
    }
    Ok(total)
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
        .replace("\\N", "\n")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("PT1H30M"), Ok(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("P1D"), Ok(TimeDelta::days(1)));
        assert_eq!(parse_duration("P1W"), Ok(TimeDelta::weeks(1)));
        assert_eq!(parse_duration("PT45M"), Ok(TimeDelta::minutes(45)));
        assert!(parse_duration("1H").is_err());
        assert!(parse_duration("-PT1H").is_err());
        assert!(parse_duration("PT1").is_err());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert!(parse_duration("P99999999999999W").is_err());
        assert!(parse_duration("PT99999999999999999S").is_err());
        assert!(parse_duration("P9999999999999D").is_err());
    }

    #[test]
    fn folded_lines_are_joined() {
        let lines = unfold("SUMMARY:Quarterly\r\n  planning\r\nUID:1\r\n");
        assert_eq!(lines[0], (1, "SUMMARY:Quarterly planning".to_string()));
        assert_eq!(lines[1], (3, "UID:1".to_string()));
    }

    #[test]
    fn property_parameters_are_split() {
        let (name, params, value) =
            split_property("DTSTART;TZID=\"Europe/Berlin\":20260316T090000").unwrap();
        assert_eq!(name, "DTSTART");
        assert_eq!(param(&params, "TZID"), Some("Europe/Berlin"));
        assert_eq!(value, "20260316T090000");
    }
}
