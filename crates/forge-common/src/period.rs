//! Time periods for historical windows and forecast lead times.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{GeoError, GeoResult};

/// A closed interval `[start, end]`.
///
/// Periods are built unchecked so that callers can hand malformed ones to
/// validation; use [`Period::validate`] to reject `end < start`.
///
/// Both period types serialize as their interval string, e.g.
/// `"2024-01-15T00:00:00+00:00/2024-01-16T00:00:00+00:00"` or `"+0h/+72h"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period<T> {
    pub start: T,
    pub end: T,
}

/// An absolute window in time, used for historical data.
pub type TimePeriod = Period<DateTime<Utc>>;

/// A window of forecast lead times relative to a model run.
pub type LeadTimePeriod = Period<Duration>;

impl<T: PartialOrd + fmt::Debug> Period<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Return the period if `start <= end`, `InvalidPeriod` otherwise.
    pub fn validate(self) -> GeoResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GeoError::InvalidPeriod(format!(
                "end {:?} lies before start {:?}",
                self.end, self.start
            )))
        }
    }

    /// Whether this period lies entirely inside `outer`.
    pub fn is_within(&self, outer: &Period<T>) -> bool {
        self.start >= outer.start && self.end <= outer.end
    }

    pub fn contains(&self, value: &T) -> bool {
        value >= &self.start && value <= &self.end
    }
}

impl Period<DateTime<Utc>> {
    /// Parse an ISO 8601 interval: "2024-01-15T00:00:00Z/2024-01-16T00:00:00Z".
    pub fn parse(s: &str) -> GeoResult<Self> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| GeoError::InvalidPeriod(format!("expected 'start/end', got '{}'", s)))?;
        Ok(Self::new(parse_datetime(start)?, parse_datetime(end)?))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl Period<Duration> {
    /// Lead time window in whole hours, e.g. `hours(0, 72)`.
    ///
    /// Meant for literal windows; panics outside chrono's range. Use
    /// [`Period::try_hours`] for untrusted input.
    pub fn hours(start: i64, end: i64) -> Self {
        Self::new(Duration::hours(start), Duration::hours(end))
    }

    pub fn try_hours(start: i64, end: i64) -> GeoResult<Self> {
        Ok(Self::new(lead_time(start)?, lead_time(end)?))
    }

    /// Parse "0/72", "+0h/+72h" or "PT0H/PT72H" as an hour window.
    pub fn parse(s: &str) -> GeoResult<Self> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| GeoError::InvalidPeriod(format!("expected 'start/end', got '{}'", s)))?;
        Self::try_hours(parse_hours(start)?, parse_hours(end)?)
    }
}

impl fmt::Display for Period<DateTime<Utc>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

impl fmt::Display for Period<Duration> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}h/+{}h", self.start.num_hours(), self.end.num_hours())
    }
}

impl Serialize for Period<DateTime<Utc>> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period<DateTime<Utc>> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Period<Duration> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period<Duration> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse an ISO 8601 timestamp, assuming UTC when no offset is given.
pub fn parse_datetime(s: &str) -> GeoResult<DateTime<Utc>> {
    let s = s.trim();

    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    // Try date only
    if let Ok(ndt) = NaiveDateTime::parse_from_str(&format!("{}T00:00:00", s), "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(GeoError::InvalidPeriod(format!("invalid timestamp '{}'", s)))
}

fn parse_hours(s: &str) -> GeoResult<i64> {
    let trimmed = s.trim();
    let upper = trimmed.to_uppercase();
    let digits = upper
        .strip_prefix("PT")
        .unwrap_or(&upper)
        .trim_end_matches('H');
    digits
        .parse::<i64>()
        .map_err(|_| GeoError::InvalidPeriod(format!("invalid lead time '{}'", trimmed)))
}

fn lead_time(hours: i64) -> GeoResult<Duration> {
    Duration::try_hours(hours)
        .ok_or_else(|| GeoError::InvalidPeriod(format!("lead time of {} hours is out of range", hours)))
}
