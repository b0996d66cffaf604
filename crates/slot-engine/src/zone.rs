//! Time-zone normalization between calendar zones and the engine's local time.

use chrono::offset::LocalResult;
use chrono::{NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::SourceError;

/// Parse an IANA zone name (e.g., "Europe/Berlin").
pub fn parse_tz(name: &str) -> Result<Tz, SourceError> {
    name.trim()
        .parse()
        .map_err(|_| SourceError::InvalidTimezone(name.to_string()))
}

/// Re-express a naive wall-clock time in `from` as naive wall-clock time in `to`.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant. Local
/// times inside a DST gap are shifted forward by an hour, like a wall clock would.
pub fn convert(naive: NaiveDateTime, from: Tz, to: Tz) -> NaiveDateTime {
    if from == to {
        return naive;
    }
    let instant = match from.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let shifted = naive.checked_add_signed(TimeDelta::hours(1));
            match shifted.map(|s| from.from_local_datetime(&s)) {
                Some(LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _)) => dt,
                // No zone has back-to-back gaps; fall back to reading the time as UTC.
                _ => from.from_utc_datetime(&naive),
            }
        }
    };
    instant.with_timezone(&to).naive_local()
}
