//! Busy/free summary over a range of days.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::gaps;
use crate::source::Occurrence;

/// Summary numbers for a calendar period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub from: NaiveDate,
    /// Last day included.
    pub to: NaiveDate,
    pub total_events: usize,
    pub average_duration_minutes: i64,
    /// Weekday with the most occurrences; ties go to the earliest day in the period.
    pub busiest_day: Option<String>,
    /// Free minutes inside business hours, summed over the period.
    pub free_minutes: i64,
}

/// Summarize `occurrences` for the days `from..=to`.
pub fn summarize(
    from: NaiveDate,
    to: NaiveDate,
    occurrences: &[Occurrence],
    config: &SchedulerConfig,
) -> Analysis {
    let total_events = occurrences.len();
    let average_duration_minutes = if total_events == 0 {
        0
    } else {
        occurrences
            .iter()
            .map(|o| o.interval.duration_minutes())
            .sum::<i64>()
            / total_events as i64
    };

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for occ in occurrences {
        *per_day.entry(occ.interval.start.date()).or_default() += 1;
    }
    let mut per_weekday: Vec<(Weekday, usize)> = Vec::new();
    for (date, count) in &per_day {
        match per_weekday.iter_mut().find(|(w, _)| *w == date.weekday()) {
            Some((_, total)) => *total += count,
            None => per_weekday.push((date.weekday(), *count)),
        }
    }
    // max_by_key keeps the last maximum; reverse so the earliest day wins ties.
    let busiest_day = per_weekday
        .iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(weekday, _)| weekday_name(*weekday).to_string());

    let busy: Vec<_> = occurrences.iter().map(|o| o.interval).collect();
    let free_minutes = from
        .iter_days()
        .take_while(|d| *d <= to)
        .map(|d| gaps::free_minutes(&busy, &config.business_window(d)))
        .sum();

    Analysis {
        from,
        to,
        total_events,
        average_duration_minutes,
        busiest_day,
        free_minutes,
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
