//! Cliff durations and calendar arithmetic.
//!
//! Cliff lengths are calendar quantities: "1-month" from January 31st lands on
//! the last day of February, not 30 days later. Everything is evaluated in UTC.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, Months, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::{ScheduleError, Timestamp};

const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Closed set of cliff lengths offered to schedule creators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CliffDuration {
    /// No lock-up; linear releases start at the schedule start.
    #[serde(rename = "no-cliff")]
    NoCliff,
    #[serde(rename = "1-minute")]
    OneMinute,
    #[serde(rename = "1-hour")]
    OneHour,
    #[serde(rename = "6-hours")]
    SixHours,
    #[serde(rename = "12-hours")]
    TwelveHours,
    #[serde(rename = "1-day")]
    OneDay,
    #[serde(rename = "5-days")]
    FiveDays,
    #[serde(rename = "2-weeks")]
    TwoWeeks,
    #[serde(rename = "1-month")]
    OneMonth,
    #[serde(rename = "3-months")]
    ThreeMonths,
    #[serde(rename = "6-months")]
    SixMonths,
    #[serde(rename = "1-year")]
    OneYear,
}

impl CliffDuration {
    /// Every variant, in increasing length.
    pub const ALL: [CliffDuration; 12] = [
        CliffDuration::NoCliff,
        CliffDuration::OneMinute,
        CliffDuration::OneHour,
        CliffDuration::SixHours,
        CliffDuration::TwelveHours,
        CliffDuration::OneDay,
        CliffDuration::FiveDays,
        CliffDuration::TwoWeeks,
        CliffDuration::OneMonth,
        CliffDuration::ThreeMonths,
        CliffDuration::SixMonths,
        CliffDuration::OneYear,
    ];

    /// Symbolic name as stored in schedule records.
    pub const fn as_str(self) -> &'static str {
        match self {
            CliffDuration::NoCliff => "no-cliff",
            CliffDuration::OneMinute => "1-minute",
            CliffDuration::OneHour => "1-hour",
            CliffDuration::SixHours => "6-hours",
            CliffDuration::TwelveHours => "12-hours",
            CliffDuration::OneDay => "1-day",
            CliffDuration::FiveDays => "5-days",
            CliffDuration::TwoWeeks => "2-weeks",
            CliffDuration::OneMonth => "1-month",
            CliffDuration::ThreeMonths => "3-months",
            CliffDuration::SixMonths => "6-months",
            CliffDuration::OneYear => "1-year",
        }
    }

    /// Calendar length of the cliff.
    pub const fn calendar(self) -> CalendarDuration {
        let zero = CalendarDuration::ZERO;
        match self {
            CliffDuration::NoCliff => zero,
            CliffDuration::OneMinute => CalendarDuration { minutes: 1, ..zero },
            CliffDuration::OneHour => CalendarDuration { hours: 1, ..zero },
            CliffDuration::SixHours => CalendarDuration { hours: 6, ..zero },
            CliffDuration::TwelveHours => CalendarDuration { hours: 12, ..zero },
            CliffDuration::OneDay => CalendarDuration { days: 1, ..zero },
            CliffDuration::FiveDays => CalendarDuration { days: 5, ..zero },
            CliffDuration::TwoWeeks => CalendarDuration { weeks: 2, ..zero },
            CliffDuration::OneMonth => CalendarDuration { months: 1, ..zero },
            CliffDuration::ThreeMonths => CalendarDuration { months: 3, ..zero },
            CliffDuration::SixMonths => CalendarDuration { months: 6, ..zero },
            CliffDuration::OneYear => CalendarDuration { years: 1, ..zero },
        }
    }

    #[inline]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, CliffDuration::NoCliff)
    }
}

impl fmt::Display for CliffDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CliffDuration {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CliffDuration::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ScheduleError::UnknownCliffDuration(s.to_string()))
    }
}

/// Calendar-aware duration. Years and months move along the calendar, the
/// remaining fields are fixed-length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalendarDuration {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl CalendarDuration {
    /// The empty duration.
    pub const ZERO: CalendarDuration = CalendarDuration {
        years: 0,
        months: 0,
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Add to `t`: years and months first (clamping the day of month), then
    /// the fixed-length remainder.
    pub fn add_to(&self, t: Timestamp) -> Result<Timestamp, ScheduleError> {
        let months = self
            .years
            .checked_mul(12)
            .and_then(|m| m.checked_add(self.months))
            .ok_or(ScheduleError::Overflow)?;
        let shifted = if months == 0 {
            t
        } else {
            t.checked_add_months(Months::new(months))
                .ok_or(ScheduleError::Overflow)?
        };

        let seconds = i64::from(self.weeks) * 7 * SECONDS_PER_DAY
            + i64::from(self.days) * SECONDS_PER_DAY
            + i64::from(self.hours) * SECONDS_PER_HOUR
            + i64::from(self.minutes) * 60;
        let delta = TimeDelta::try_seconds(seconds).ok_or(ScheduleError::Overflow)?;
        shifted
            .checked_add_signed(delta)
            .ok_or(ScheduleError::Overflow)
    }
}

/// Absolute cliff instant for a schedule starting at `start`.
/// Equals `start` for [`CliffDuration::NoCliff`].
pub fn resolve_cliff(start: Timestamp, cliff: CliffDuration) -> Result<Timestamp, ScheduleError> {
    cliff.calendar().add_to(start)
}

/// Human-readable length of `start..end`, e.g. `"1 year, 2 months, 3 days"`.
///
/// Units are years, months, days and hours, largest first; zero units are
/// omitted. Empty or inverted intervals render as `""`.
pub fn get_duration(start: Timestamp, end: Timestamp) -> String {
    if end <= start {
        return String::new();
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let anchor = loop {
        if months <= 0 {
            months = 0;
            break start;
        }
        match start.checked_add_months(Months::new(months as u32)) {
            Some(a) if a <= end => break a,
            _ => months -= 1,
        }
    };

    let rest = (end - anchor).num_seconds();
    let parts = [
        (months / 12, "year"),
        (months % 12, "month"),
        ((rest / SECONDS_PER_DAY) as i32, "day"),
        ((rest % SECONDS_PER_DAY / SECONDS_PER_HOUR) as i32, "hour"),
    ];

    parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| {
            if *n == 1 {
                format!("1 {unit}")
            } else {
                format!("{n} {unit}s")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/* ---------------------------------- TESTS ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn no_cliff_is_identity() {
        let start = at(2024, 3, 10, 8, 30);
        assert_eq!(resolve_cliff(start, CliffDuration::NoCliff).unwrap(), start);
        assert!(CliffDuration::NoCliff.calendar().is_zero());
        assert!(!CliffDuration::NoCliff.is_enabled());
    }

    #[test]
    fn fixed_length_cliffs() {
        let start = at(2024, 1, 1, 0, 0);
        let cases = [
            (CliffDuration::OneMinute, at(2024, 1, 1, 0, 1)),
            (CliffDuration::OneHour, at(2024, 1, 1, 1, 0)),
            (CliffDuration::SixHours, at(2024, 1, 1, 6, 0)),
            (CliffDuration::TwelveHours, at(2024, 1, 1, 12, 0)),
            (CliffDuration::OneDay, at(2024, 1, 2, 0, 0)),
            (CliffDuration::FiveDays, at(2024, 1, 6, 0, 0)),
            (CliffDuration::TwoWeeks, at(2024, 1, 15, 0, 0)),
        ];
        for (cliff, expected) in cases {
            assert_eq!(resolve_cliff(start, cliff).unwrap(), expected, "{cliff}");
        }
    }

    #[test]
    fn month_cliffs_follow_the_calendar() {
        assert_eq!(
            resolve_cliff(at(2024, 1, 1, 0, 0), CliffDuration::OneMonth).unwrap(),
            at(2024, 2, 1, 0, 0)
        );
        // Clamped to the end of a leap February.
        assert_eq!(
            resolve_cliff(at(2024, 1, 31, 9, 0), CliffDuration::OneMonth).unwrap(),
            at(2024, 2, 29, 9, 0)
        );
        assert_eq!(
            resolve_cliff(at(2024, 11, 30, 0, 0), CliffDuration::ThreeMonths).unwrap(),
            at(2025, 2, 28, 0, 0)
        );
        assert_eq!(
            resolve_cliff(at(2024, 2, 29, 0, 0), CliffDuration::OneYear).unwrap(),
            at(2025, 2, 28, 0, 0)
        );
        assert_eq!(
            resolve_cliff(at(2024, 7, 15, 0, 0), CliffDuration::SixMonths).unwrap(),
            at(2025, 1, 15, 0, 0)
        );
    }

    #[test]
    fn parse_and_display_roundtrip_names() {
        for c in CliffDuration::ALL {
            assert_eq!(c.as_str().parse::<CliffDuration>().unwrap(), c);
        }
        assert_eq!(
            "2-months".parse::<CliffDuration>(),
            Err(ScheduleError::UnknownCliffDuration("2-months".into()))
        );
    }

    #[test]
    fn serde_uses_symbolic_names() {
        let json = serde_json::to_string(&CliffDuration::SixHours).unwrap();
        assert_eq!(json, "\"6-hours\"");
        let back: CliffDuration = serde_json::from_str("\"no-cliff\"").unwrap();
        assert_eq!(back, CliffDuration::NoCliff);
    }

    #[test]
    fn duration_breakdown() {
        assert_eq!(get_duration(at(2024, 1, 1, 0, 0), at(2025, 1, 1, 0, 0)), "1 year");
        assert_eq!(
            get_duration(at(2024, 1, 1, 0, 0), at(2025, 3, 4, 5, 0)),
            "1 year, 2 months, 3 days, 5 hours"
        );
        assert_eq!(
            get_duration(at(2024, 1, 1, 0, 0), at(2026, 2, 2, 1, 0)),
            "2 years, 1 month, 1 day, 1 hour"
        );
        assert_eq!(get_duration(at(2024, 1, 31, 0, 0), at(2024, 3, 1, 0, 0)), "1 month, 1 day");
        assert_eq!(get_duration(at(2024, 1, 1, 0, 0), at(2024, 1, 1, 23, 0)), "23 hours");
    }

    #[test]
    fn duration_of_empty_or_inverted_interval_is_blank() {
        let t = at(2024, 6, 1, 0, 0);
        assert_eq!(get_duration(t, t), "");
        assert_eq!(get_duration(t, at(2024, 5, 1, 0, 0)), "");
        // Below the hour granularity.
        assert_eq!(get_duration(t, at(2024, 6, 1, 0, 30)), "");
    }
}
