//! Human-readable messages returned to the conversational agent.

use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};

use crate::analysis::Analysis;
use crate::conflict::Conflict;
use crate::finder::CandidateSlot;
use crate::preference::Preference;
use crate::source::{CalendarEvent, Occurrence};

const HM: &str = "%H:%M";
const DAY: &str = "%Y-%m-%d";

pub fn slots(date: NaiveDate, duration_minutes: i64, preference: Preference, slots: &[CandidateSlot]) -> String {
    if slots.is_empty() {
        let mut msg = format!(
            "No availability: there is no free {}-minute slot on {}",
            duration_minutes,
            date.format(DAY)
        );
        if preference != Preference::Any {
            let _ = write!(msg, " in the {}", preference);
        }
        msg.push('.');
        return msg;
    }

    let mut msg = format!(
        "Found {} {}-minute slot{} on {}:\n",
        slots.len(),
        duration_minutes,
        if slots.len() == 1 { "" } else { "s" },
        date.format(DAY)
    );
    for (i, slot) in slots.iter().enumerate() {
        let _ = writeln!(
            msg,
            "{}. {} - {} (score {}/100, {})",
            i + 1,
            slot.start.format(HM),
            slot.end.format(HM),
            slot.score,
            slot.rationale
        );
    }
    msg.push_str("Which slot would you prefer?");
    msg
}

pub fn suggestions(duration_minutes: i64, slots: &[CandidateSlot]) -> String {
    if slots.is_empty() {
        return format!(
            "No availability: no free {}-minute slot in the coming days.",
            duration_minutes
        );
    }
    let mut msg = format!("Suggested {}-minute meeting times:\n", duration_minutes);
    for (i, slot) in slots.iter().enumerate() {
        let _ = writeln!(
            msg,
            "{}. {} {} - {} (score {}/100, {})",
            i + 1,
            slot.start.format("%a %Y-%m-%d"),
            slot.start.format(HM),
            slot.end.format(HM),
            slot.score,
            slot.rationale
        );
    }
    msg.push_str("Shall I schedule option 1?");
    msg
}

pub fn events(date: NaiveDate, occurrences: &[Occurrence]) -> String {
    if occurrences.is_empty() {
        return format!("No events scheduled for {}.", date.format(DAY));
    }
    let mut msg = format!("Events for {}:\n", date.format(DAY));
    for (i, occ) in occurrences.iter().enumerate() {
        let _ = writeln!(
            msg,
            "{}. {} {} - {}",
            i + 1,
            occ.title,
            occ.interval.start.format(HM),
            occ.interval.end.format(HM)
        );
    }
    msg.truncate(msg.trim_end().len());
    msg
}

pub fn created(event: &CalendarEvent, conflicts: &[Conflict]) -> String {
    let mut msg = format!(
        "Created event '{}' on {} from {} to {} ({} minutes).",
        event.title,
        event.start.format(DAY),
        event.start.format(HM),
        event.end.format(HM),
        event.duration_minutes()
    );
    append_conflicts(&mut msg, conflicts);
    msg
}

pub fn rescheduled(event: &CalendarEvent, reason: &str, conflicts: &[Conflict]) -> String {
    let mut msg = format!(
        "Rescheduled '{}' to {} {} - {} (reason: {}).",
        event.title,
        event.start.format(DAY),
        event.start.format(HM),
        event.end.format(HM),
        reason
    );
    append_conflicts(&mut msg, conflicts);
    msg
}

fn append_conflicts(msg: &mut String, conflicts: &[Conflict]) {
    if conflicts.is_empty() {
        msg.push_str(" No conflicts found.");
        return;
    }
    let _ = write!(msg, " Warning: overlaps {} busy period", conflicts.len());
    if conflicts.len() > 1 {
        msg.push('s');
    }
    msg.push(':');
    for c in conflicts {
        let _ = write!(
            msg,
            " {}-{} ({} min)",
            c.busy.start.format(HM),
            c.busy.end.format(HM),
            c.overlap_minutes
        );
    }
    msg.push('.');
}

pub fn analysis(a: &Analysis) -> String {
    let mut msg = format!(
        "Calendar analysis {} to {}:\n",
        a.from.format(DAY),
        a.to.format(DAY)
    );
    let _ = writeln!(msg, "Total events: {}", a.total_events);
    if a.total_events > 0 {
        let _ = writeln!(msg, "Average duration: {} minutes", a.average_duration_minutes);
    }
    if let Some(day) = &a.busiest_day {
        let _ = writeln!(msg, "Busiest day: {}", day);
    }
    let _ = write!(
        msg,
        "Free time in business hours: {}h {:02}m",
        a.free_minutes / 60,
        a.free_minutes % 60
    );
    msg
}

pub fn help() -> String {
    [
        "Calendar assistant actions:",
        "find_slots: free slots on a day (date, duration, preferences, limit)",
        "list_events: events on a day (date)",
        "create_event: schedule an event (title, start_time, duration, description)",
        "reschedule_meeting: move an event (event_id, new_start_time, reason)",
        "analyze_calendar: busy/free summary (period = day or week)",
        "suggest_optimal_time: best slots over the coming days (duration, days)",
    ]
    .join("\n")
}

pub fn timestamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%dT%H:%M:%S").to_string()
}
