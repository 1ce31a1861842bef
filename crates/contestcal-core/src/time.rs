//! Time windows and zone conversion.
//!
//! All record start times live in a fixed IANA target zone. Conversions here
//! are true zone conversions through `chrono-tz`, so they stay correct across
//! daylight-saving transitions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A time window for syncing contests.
///
/// Represents a closed interval `[start, end]` in UTC: both bounds are
/// inclusive so a contest starting exactly at either edge is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (inclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// If `start` is after `end` the bounds are swapped.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates the window `[now, now + days]`.
    ///
    /// `now` is captured once by the caller so every record of a run is
    /// tested against the same bounds.
    pub fn starting_at(now: DateTime<Utc>, days: u32) -> Self {
        Self::new(now, now + Duration::days(i64::from(days)))
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window, bounds included.
    pub fn contains<Z: TimeZone>(&self, dt: &DateTime<Z>) -> bool {
        let dt = dt.with_timezone(&Utc);
        self.start <= dt && dt <= self.end
    }
}

/// Parses an IANA zone identifier such as `Asia/Tehran`.
pub fn parse_zone(name: &str) -> Result<Tz, String> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| format!("unknown time zone: {}", name))
}

/// Converts a zoned timestamp into the target zone.
pub fn to_zone<Z: TimeZone>(dt: &DateTime<Z>, target: Tz) -> DateTime<Tz> {
    dt.with_timezone(&target)
}

/// Converts UTC epoch seconds into the target zone.
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn from_epoch_seconds(secs: i64, target: Tz) -> Option<DateTime<Tz>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.with_timezone(&target))
}
