//! Scheduler configuration.
//!
//! Business hours, the result limit and the backend outage policy travel in an
//! explicit [`SchedulerConfig`] passed to every call that needs them. Values come
//! from defaults, an optional JSON file, then `SLOTS_*` environment variables.

use std::env;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SourceError};
use crate::interval::TimeInterval;
use crate::preference::Preference;
use crate::zone;

/// What to do when the calendar backend cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutagePolicy {
    /// Surface the outage to the caller.
    #[default]
    Fail,
    /// Log the outage and continue as if no busy intervals are known.
    AssumeFree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// IANA zone all local times are expressed in.
    pub timezone: String,
    /// Start of the business-hours window on each day.
    pub day_start: NaiveTime,
    /// End of the business-hours window on each day.
    pub day_end: NaiveTime,
    /// Maximum candidates returned per request.
    pub result_limit: usize,
    pub default_duration_minutes: i64,
    pub default_preference: Preference,
    /// Days searched by optimal-time suggestions.
    pub suggestion_days: u32,
    /// Largest `days` a suggestion request may ask for.
    pub max_suggestion_days: u32,
    pub outage_policy: OutagePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            day_start: NaiveTime::MIN + TimeDelta::hours(9),
            day_end: NaiveTime::MIN + TimeDelta::hours(17),
            result_limit: 3,
            default_duration_minutes: 60,
            default_preference: Preference::Any,
            suggestion_days: 3,
            max_suggestion_days: 31,
            outage_policy: OutagePolicy::Fail,
        }
    }
}

impl SchedulerConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Apply `SLOTS_TIMEZONE`, `SLOTS_DAY_START`, `SLOTS_DAY_END`,
    /// `SLOTS_RESULT_LIMIT` and `SLOTS_OUTAGE_POLICY` from the environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Same as [`SchedulerConfig::with_env_overrides`] with an injectable lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(tz) = lookup("SLOTS_TIMEZONE") {
            self.timezone = tz;
        }
        if let Some(raw) = lookup("SLOTS_DAY_START") {
            self.day_start = parse_time("SLOTS_DAY_START", &raw)?;
        }
        if let Some(raw) = lookup("SLOTS_DAY_END") {
            self.day_end = parse_time("SLOTS_DAY_END", &raw)?;
        }
        if let Some(raw) = lookup("SLOTS_RESULT_LIMIT") {
            self.result_limit = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("SLOTS_RESULT_LIMIT is not a count: '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup("SLOTS_OUTAGE_POLICY") {
            self.outage_policy = match raw.trim() {
                "fail" => OutagePolicy::Fail,
                "assume_free" => OutagePolicy::AssumeFree,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "SLOTS_OUTAGE_POLICY must be fail or assume_free, got '{}'",
                        other
                    )))
                }
            };
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        zone::parse_tz(&self.timezone)
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone '{}'", self.timezone)))?;
        if self.day_end <= self.day_start {
            return Err(ConfigError::Invalid(format!(
                "day_end {} must be after day_start {}",
                self.day_end, self.day_start
            )));
        }
        if self.suggestion_days == 0 || self.suggestion_days > self.max_suggestion_days {
            return Err(ConfigError::Invalid(format!(
                "suggestion_days must be between 1 and max_suggestion_days ({}), got {}",
                self.max_suggestion_days, self.suggestion_days
            )));
        }
        if self.default_duration_minutes <= 0 {
            return Err(ConfigError::Invalid(format!(
                "default_duration_minutes must be positive, got {}",
                self.default_duration_minutes
            )));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<chrono_tz::Tz, SourceError> {
        zone::parse_tz(&self.timezone)
    }

    /// The business-hours window on `date`.
    pub fn business_window(&self, date: NaiveDate) -> TimeInterval {
        TimeInterval {
            start: NaiveDateTime::new(date, self.day_start),
            end: NaiveDateTime::new(date, self.day_end),
        }
    }
}

fn parse_time(key: &str, raw: &str) -> Result<NaiveTime, ConfigError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ConfigError::Invalid(format!("{} is not a time of day: '{}'", key, raw)))
}
