//! Agent action-group dispatch.
//!
//! An inbound request carries an `action` parameter plus flat string parameters.
//! [`Action::parse`] turns it into a closed [`Action`] enum, [`Dispatcher`]
//! executes it against a [`CalendarSource`], and the answer is wrapped into the
//! action-group response envelope.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::analysis;
use crate::config::SchedulerConfig;
use crate::conflict::{find_conflicts, Conflict};
use crate::error::{DispatchError, SlotError, SourceError};
use crate::finder::{self, CandidateSlot, SlotRequest};
use crate::interval::TimeInterval;
use crate::preference::Preference;
use crate::render;
use crate::source::{self, CalendarSource, NewEvent};

/// Action names accepted in the `action` parameter.
pub const ACTIONS: [&str; 7] = [
    "find_slots",
    "list_events",
    "create_event",
    "reschedule_meeting",
    "analyze_calendar",
    "suggest_optimal_time",
    "help",
];

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// Inbound action-group invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentRequest {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub parameters: Vec<Parameter>,
}

impl AgentRequest {
    /// Value of the first parameter called `name`, ignoring blank values.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub message_version: String,
    pub response: ResponseEnvelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "application/json")]
    pub json: JsonBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonBody {
    /// A JSON document encoded as a string ([`Payload`]).
    pub body: String,
}

/// The document carried inside [`JsonBody::body`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub message: String,
    pub timestamp: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AgentResponse {
    /// Decode the inner payload string.
    pub fn payload(&self) -> Result<Payload, serde_json::Error> {
        serde_json::from_str(&self.response.response_body.json.body)
    }

    pub fn status_code(&self) -> u16 {
        self.response.http_status_code
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
}

impl Period {
    pub fn days(&self) -> u32 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FindSlots {
        date: NaiveDate,
        duration_minutes: i64,
        preference: Preference,
        limit: usize,
    },
    ListEvents {
        date: NaiveDate,
    },
    CreateEvent {
        title: String,
        start: NaiveDateTime,
        duration_minutes: i64,
        description: String,
    },
    RescheduleMeeting {
        event_id: String,
        new_start: NaiveDateTime,
        reason: String,
    },
    AnalyzeCalendar {
        from: NaiveDate,
        period: Period,
    },
    SuggestOptimalTime {
        from: NaiveDate,
        duration_minutes: i64,
        days: u32,
        limit: usize,
    },
    Help,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::FindSlots { .. } => "find_slots",
            Action::ListEvents { .. } => "list_events",
            Action::CreateEvent { .. } => "create_event",
            Action::RescheduleMeeting { .. } => "reschedule_meeting",
            Action::AnalyzeCalendar { .. } => "analyze_calendar",
            Action::SuggestOptimalTime { .. } => "suggest_optimal_time",
            Action::Help => "help",
        }
    }

    /// Build an action from the request parameters.
    ///
    /// `today` anchors relative dates ("today", "tomorrow") and the start of
    /// analysis and suggestion periods. A missing `action`
    /// parameter means [`Action::Help`].
    pub fn parse(
        request: &AgentRequest,
        config: &SchedulerConfig,
        today: NaiveDate,
    ) -> Result<Self, DispatchError> {
        let Some(name) = request.param("action") else {
            return Ok(Action::Help);
        };
        let tz = config.timezone()?;

        let action = match name {
            "find_slots" => Action::FindSlots {
                date: parse_date(request.param("date"), today)?,
                duration_minutes: parse_duration(request, config)?,
                preference: parse_preference(request.param("preferences"), config),
                limit: parse_limit(request, config)?,
            },
            "list_events" => Action::ListEvents {
                date: parse_date(request.param("date"), today)?,
            },
            "create_event" => Action::CreateEvent {
                title: request.param("title").unwrap_or("New Meeting").to_string(),
                start: parse_instant(
                    "start_time",
                    request
                        .param("start_time")
                        .ok_or(DispatchError::MissingParameter("start_time"))?,
                    tz,
                )?,
                duration_minutes: parse_duration(request, config)?,
                description: request.param("description").unwrap_or_default().to_string(),
            },
            "reschedule_meeting" => Action::RescheduleMeeting {
                event_id: request
                    .param("event_id")
                    .or_else(|| request.param("meeting_id"))
                    .ok_or(DispatchError::MissingParameter("event_id"))?
                    .to_string(),
                new_start: parse_instant(
                    "new_start_time",
                    request
                        .param("new_start_time")
                        .or_else(|| request.param("new_time"))
                        .ok_or(DispatchError::MissingParameter("new_start_time"))?,
                    tz,
                )?,
                reason: request
                    .param("reason")
                    .unwrap_or("schedule conflict")
                    .to_string(),
            },
            "analyze_calendar" => Action::AnalyzeCalendar {
                from: today,
                period: match request.param("period").unwrap_or("week") {
                    "day" | "today" => Period::Day,
                    "week" => Period::Week,
                    other => {
                        return Err(DispatchError::InvalidParameter {
                            name: "period",
                            value: other.to_string(),
                        })
                    }
                },
            },
            "suggest_optimal_time" => Action::SuggestOptimalTime {
                from: today,
                duration_minutes: parse_duration(request, config)?,
                days: match request.param("days") {
                    None => config.suggestion_days,
                    Some(raw) => raw
                        .parse()
                        .ok()
                        .filter(|d| (1..=config.max_suggestion_days).contains(d))
                        .ok_or_else(|| DispatchError::InvalidParameter {
                            name: "days",
                            value: raw.to_string(),
                        })?,
                },
                limit: parse_limit(request, config)?,
            },
            "help" => Action::Help,
            other => return Err(DispatchError::UnknownAction(other.to_string())),
        };
        Ok(action)
    }
}

fn parse_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DispatchError> {
    match raw.unwrap_or("today") {
        "today" => Ok(today),
        "tomorrow" => days_after(today, 1),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").map_err(|_| {
            DispatchError::InvalidParameter {
                name: "date",
                value: other.to_string(),
            }
        }),
    }
}

/// `date` moved `days` forward; dates past the end of the calendar are rejected.
fn days_after(date: NaiveDate, days: u32) -> Result<NaiveDate, DispatchError> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| DispatchError::InvalidParameter {
            name: "date",
            value: date.to_string(),
        })
}

fn parse_duration(request: &AgentRequest, config: &SchedulerConfig) -> Result<i64, DispatchError> {
    match request.param("duration") {
        None => Ok(config.default_duration_minutes),
        Some(raw) => raw.parse().map_err(|_| DispatchError::InvalidParameter {
            name: "duration",
            value: raw.to_string(),
        }),
    }
}

fn parse_limit(request: &AgentRequest, config: &SchedulerConfig) -> Result<usize, DispatchError> {
    match request.param("limit") {
        None => Ok(config.result_limit),
        Some(raw) => raw.parse().map_err(|_| DispatchError::InvalidParameter {
            name: "limit",
            value: raw.to_string(),
        }),
    }
}

/// Unknown tags keep every slot rather than failing the request.
fn parse_preference(raw: Option<&str>, config: &SchedulerConfig) -> Preference {
    match raw {
        None => config.default_preference,
        Some(tag) => tag.parse().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring slot preference");
            Preference::Any
        }),
    }
}

/// Accept RFC 3339 (converted into the local zone) or naive local date-times.
fn parse_instant(
    name: &'static str,
    raw: &str,
    local: chrono_tz::Tz,
) -> Result<NaiveDateTime, DispatchError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .map_err(|_| DispatchError::InvalidParameter {
            name,
            value: raw.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// The result of a successful action.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub message: String,
    pub data: Option<Value>,
}

pub struct Dispatcher<'a, S: CalendarSource + ?Sized> {
    config: &'a SchedulerConfig,
    source: &'a mut S,
}

impl<'a, S: CalendarSource + ?Sized> Dispatcher<'a, S> {
    pub fn new(config: &'a SchedulerConfig, source: &'a mut S) -> Self {
        Self { config, source }
    }

    /// Parse, execute and wrap one request. Never fails: errors become non-200 envelopes.
    pub fn handle(&mut self, request: &AgentRequest, now: NaiveDateTime) -> AgentResponse {
        let result = Action::parse(request, self.config, now.date()).and_then(|action| {
            info!(action = action.name(), "dispatching agent action");
            self.execute(action)
        });

        match result {
            Ok(outcome) => envelope(request, 200, "success", outcome.message, outcome.data, now),
            Err(err) => {
                let status = err.status_code();
                warn!(error = %err, status, "agent action failed");
                let (message, data) = match &err {
                    DispatchError::UnknownAction(_) => (
                        format!("{}\n\n{}", err, render::help()),
                        Some(json!({ "known_actions": ACTIONS })),
                    ),
                    _ => (err.to_string(), None),
                };
                envelope(request, status, "error", message, data, now)
            }
        }
    }

    pub fn execute(&mut self, action: Action) -> Result<Outcome, DispatchError> {
        match action {
            Action::FindSlots {
                date,
                duration_minutes,
                preference,
                limit,
            } => self.find_slots(date, duration_minutes, preference, limit),
            Action::ListEvents { date } => self.list_events(date),
            Action::CreateEvent {
                title,
                start,
                duration_minutes,
                description,
            } => self.create_event(title, start, duration_minutes, description),
            Action::RescheduleMeeting {
                event_id,
                new_start,
                reason,
            } => self.reschedule(&event_id, new_start, &reason),
            Action::AnalyzeCalendar { from, period } => self.analyze(from, period),
            Action::SuggestOptimalTime {
                from,
                duration_minutes,
                days,
                limit,
            } => self.suggest(from, duration_minutes, days, limit),
            Action::Help => Ok(Outcome {
                message: render::help(),
                data: Some(json!({ "actions": ACTIONS })),
            }),
        }
    }

    fn find_slots(
        &mut self,
        date: NaiveDate,
        duration_minutes: i64,
        preference: Preference,
        limit: usize,
    ) -> Result<Outcome, DispatchError> {
        let request = SlotRequest {
            window: self.config.business_window(date),
            duration_minutes,
            preference,
            limit,
        };
        let busy = source::busy_intervals(&*self.source, &request.window, self.config)?;
        let slots = finder::find_slots_for(&request, &busy)?;

        Ok(Outcome {
            message: render::slots(date, duration_minutes, preference, &slots),
            data: Some(json!({
                "available_slots": slots,
                "duration_minutes": duration_minutes,
                "date": date,
                "preferences": preference,
            })),
        })
    }

    fn list_events(&mut self, date: NaiveDate) -> Result<Outcome, DispatchError> {
        let found = source::occurrences(&*self.source, &whole_day(date)?, self.config)?;
        Ok(Outcome {
            message: render::events(date, &found),
            data: Some(json!({ "events": found, "total": found.len() })),
        })
    }

    fn create_event(
        &mut self,
        title: String,
        start: NaiveDateTime,
        duration_minutes: i64,
        description: String,
    ) -> Result<Outcome, DispatchError> {
        let end = TimeDelta::try_minutes(duration_minutes)
            .filter(|_| duration_minutes > 0)
            .and_then(|d| start.checked_add_signed(d))
            .ok_or(SlotError::InvalidDuration(duration_minutes))?;
        let proposed = TimeInterval::new(start, end)?;
        let conflicts = self.conflicts(&proposed, None)?;

        let created = self.source.create_event(NewEvent {
            title,
            description,
            start,
            duration_minutes,
        })?;

        Ok(Outcome {
            message: render::created(&created, &conflicts),
            data: Some(json!({ "event": created, "conflicts": conflicts })),
        })
    }

    fn reschedule(
        &mut self,
        event_id: &str,
        new_start: NaiveDateTime,
        reason: &str,
    ) -> Result<Outcome, DispatchError> {
        let moved = self.source.move_event(event_id, new_start, reason)?;
        let conflicts = self.conflicts(&moved.interval(), Some(&moved.uid))?;

        Ok(Outcome {
            message: render::rescheduled(&moved, reason, &conflicts),
            data: Some(json!({ "event": moved, "reason": reason, "conflicts": conflicts })),
        })
    }

    fn analyze(&mut self, from: NaiveDate, period: Period) -> Result<Outcome, DispatchError> {
        let to = days_after(from, period.days() - 1)?;
        let window = TimeInterval {
            start: whole_day(from)?.start,
            end: whole_day(to)?.end,
        };
        let found = source::occurrences(&*self.source, &window, self.config)?;
        let summary = analysis::summarize(from, to, &found, self.config);

        Ok(Outcome {
            message: render::analysis(&summary),
            data: Some(json!(summary)),
        })
    }

    fn suggest(
        &mut self,
        first: NaiveDate,
        duration_minutes: i64,
        days: u32,
        limit: usize,
    ) -> Result<Outcome, DispatchError> {
        let mut candidates: Vec<CandidateSlot> = Vec::new();
        for offset in 0..days {
            let window = self.config.business_window(days_after(first, offset)?);
            let busy = source::busy_intervals(&*self.source, &window, self.config)?;
            candidates.extend(finder::find_slots(
                window.start,
                window.end,
                &busy,
                duration_minutes,
            )?);
        }
        // Stable: chronological order is kept within equal scores.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(limit);

        Ok(Outcome {
            message: render::suggestions(duration_minutes, &candidates),
            data: Some(json!({ "suggestions": candidates, "duration_minutes": duration_minutes })),
        })
    }

    /// Busy periods overlapping `proposed`, skipping the event `exclude` itself.
    fn conflicts(
        &self,
        proposed: &TimeInterval,
        exclude: Option<&str>,
    ) -> Result<Vec<Conflict>, SourceError> {
        let busy: Vec<TimeInterval> = source::occurrences(&*self.source, proposed, self.config)?
            .into_iter()
            .filter(|o| Some(o.uid.as_str()) != exclude)
            .map(|o| o.interval)
            .collect();
        Ok(find_conflicts(proposed, &busy))
    }
}

fn whole_day(date: NaiveDate) -> Result<TimeInterval, DispatchError> {
    Ok(TimeInterval {
        start: date.and_time(NaiveTime::MIN),
        end: days_after(date, 1)?.and_time(NaiveTime::MIN),
    })
}

fn envelope(
    request: &AgentRequest,
    status_code: u16,
    status: &str,
    message: String,
    data: Option<Value>,
    now: NaiveDateTime,
) -> AgentResponse {
    let payload = Payload {
        message,
        timestamp: render::timestamp(now),
        status: status.to_string(),
        data,
    };
    // Serializing a struct of strings and JSON values cannot fail.
    let body = serde_json::to_string(&payload).unwrap_or_default();

    AgentResponse {
        message_version: "1.0".to_string(),
        response: ResponseEnvelope {
            action_group: request.action_group.clone(),
            api_path: request.api_path.clone(),
            http_method: "POST".to_string(),
            http_status_code: status_code,
            response_body: ResponseBody {
                json: JsonBody { body },
            },
        },
    }
}
