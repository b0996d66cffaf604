//! # slot-engine
//!
//! Free meeting-slot computation for calendar assistants.
//!
//! The core is [`find_slots`]: a single left-to-right sweep that subtracts busy
//! intervals from a business-hours window and proposes one scored candidate per
//! free gap. Around it sit the pieces a scheduling agent needs to feed and use
//! that core: recurring-event expansion, iCalendar reduction, a calendar-source
//! seam, and a closed action dispatcher that answers agent action-group calls.
//!
//! ## Modules
//!
//! - [`finder`]: busy list + window + duration → scored candidate slots
//! - [`preference`]: morning/afternoon post-filter
//! - [`interval`]: half-open `[start, end)` intervals
//! - [`gaps`]: merged busy periods and maximal free gaps
//! - [`conflict`]: overlaps between a proposed time and busy periods
//! - [`recurrence`]: RRULE → busy intervals with DST handling
//! - [`ical`]: VEVENT text → calendar events
//! - [`zone`]: time-zone normalization
//! - [`source`]: calendar backend trait and in-memory backend
//! - [`config`]: explicit scheduler configuration
//! - [`dispatch`]: action-group request → action → response envelope
//! - [`analysis`], [`render`]: summaries and agent-facing messages
//! - [`error`]: Error types

pub mod analysis;
pub mod config;
pub mod conflict;
pub mod dispatch;
pub mod error;
pub mod finder;
pub mod gaps;
pub mod ical;
pub mod interval;
pub mod preference;
pub mod recurrence;
pub mod render;
pub mod source;
pub mod zone;

pub use config::{OutagePolicy, SchedulerConfig};
pub use conflict::find_conflicts;
pub use dispatch::{Action, AgentRequest, AgentResponse, Dispatcher};
pub use error::{ConfigError, DispatchError, SlotError, SourceError};
pub use finder::{find_slots, find_slots_for, CandidateSlot, SlotRequest};
pub use interval::TimeInterval;
pub use preference::Preference;
pub use source::{CalendarEvent, CalendarSource, InMemoryCalendar, NewEvent};
