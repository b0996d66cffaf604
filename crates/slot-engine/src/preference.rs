//! Coarse time-of-day preference applied after slot generation.

use std::fmt;
use std::str::FromStr;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::finder::CandidateSlot;

/// Slots starting before this hour count as morning.
const NOON: u32 = 12;
/// Afternoon slots start in `[NOON, AFTERNOON_END)`.
const AFTERNOON_END: u32 = 17;

/// Time-of-day filter for candidate slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    #[default]
    Any,
    /// Start hour `< 12`.
    Morning,
    /// Start hour in `[12, 17)`.
    Afternoon,
}

impl Preference {
    /// Whether `slot` passes this filter. Only the start hour is inspected.
    pub fn admits(&self, slot: &CandidateSlot) -> bool {
        let hour = slot.start.hour();
        match self {
            Preference::Any => true,
            Preference::Morning => hour < NOON,
            Preference::Afternoon => (NOON..AFTERNOON_END).contains(&hour),
        }
    }

    /// Drop the slots this preference rejects, keeping the order of the rest.
    pub fn retain(&self, slots: &mut Vec<CandidateSlot>) {
        slots.retain(|slot| self.admits(slot));
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Any => "any",
            Preference::Morning => "morning",
            Preference::Afternoon => "afternoon",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a preference tag outside `any`/`morning`/`afternoon`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPreference(pub String);

impl fmt::Display for UnknownPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown preference '{}' (expected any, morning or afternoon)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPreference {}

impl FromStr for Preference {
    type Err = UnknownPreference;

    /// Case-insensitive. An empty tag means [`Preference::Any`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Ok(Preference::Any),
            "morning" => Ok(Preference::Morning),
            "afternoon" => Ok(Preference::Afternoon),
            _ => Err(UnknownPreference(s.to_string())),
        }
    }
}
