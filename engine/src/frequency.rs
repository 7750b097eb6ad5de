//! Release cadence and release counting.
//!
//! Every cadence maps to a fixed number of seconds. A month is the average
//! Gregorian month (2_629_746 s), so monthly cadences drift against the
//! calendar over long schedules; chart dates are produced with the same table
//! so counts, projections and series stay mutually consistent.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ScheduleError, Timestamp};

/// Seconds in one minute.
pub const MINUTE_SECONDS: u64 = 60;
/// Seconds in one hour.
pub const HOUR_SECONDS: u64 = 3_600;
/// Seconds in one day.
pub const DAY_SECONDS: u64 = 86_400;
/// Seconds in one week.
pub const WEEK_SECONDS: u64 = 604_800;
/// Average Gregorian month: 365.2425 days / 12.
pub const MONTH_SECONDS: u64 = 2_629_746;
/// Three average months.
pub const QUARTER_SECONDS: u64 = 3 * MONTH_SECONDS;
/// Twelve average months.
pub const YEAR_SECONDS: u64 = 12 * MONTH_SECONDS;

/// Unit for custom `every-N-<unit>` cadences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrequencyUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl FrequencyUnit {
    const ALL: [FrequencyUnit; 7] = [
        FrequencyUnit::Minute,
        FrequencyUnit::Hour,
        FrequencyUnit::Day,
        FrequencyUnit::Week,
        FrequencyUnit::Month,
        FrequencyUnit::Quarter,
        FrequencyUnit::Year,
    ];

    pub const fn seconds(self) -> u64 {
        match self {
            FrequencyUnit::Minute => MINUTE_SECONDS,
            FrequencyUnit::Hour => HOUR_SECONDS,
            FrequencyUnit::Day => DAY_SECONDS,
            FrequencyUnit::Week => WEEK_SECONDS,
            FrequencyUnit::Month => MONTH_SECONDS,
            FrequencyUnit::Quarter => QUARTER_SECONDS,
            FrequencyUnit::Year => YEAR_SECONDS,
        }
    }

    const fn singular(self) -> &'static str {
        match self {
            FrequencyUnit::Minute => "minute",
            FrequencyUnit::Hour => "hour",
            FrequencyUnit::Day => "day",
            FrequencyUnit::Week => "week",
            FrequencyUnit::Month => "month",
            FrequencyUnit::Quarter => "quarter",
            FrequencyUnit::Year => "year",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        let singular = s.strip_suffix('s').unwrap_or(s);
        FrequencyUnit::ALL.into_iter().find(|u| u.singular() == singular)
    }
}

/// How often linear releases happen after the cliff.
///
/// Serialized by name: `"monthly"`, `"continuous"`, `"every-2-weeks"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReleaseFrequency {
    /// Per-second streaming.
    Continuous,
    Minute,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// `every-N-<unit>`; `count` is at least 1.
    Every { count: u32, unit: FrequencyUnit },
}

impl ReleaseFrequency {
    /// Length of one release interval in seconds.
    pub const fn interval_seconds(self) -> u64 {
        match self {
            ReleaseFrequency::Continuous => 1,
            ReleaseFrequency::Minute => MINUTE_SECONDS,
            ReleaseFrequency::Hourly => HOUR_SECONDS,
            ReleaseFrequency::Daily => DAY_SECONDS,
            ReleaseFrequency::Weekly => WEEK_SECONDS,
            ReleaseFrequency::Monthly => MONTH_SECONDS,
            ReleaseFrequency::Quarterly => QUARTER_SECONDS,
            ReleaseFrequency::Yearly => YEAR_SECONDS,
            ReleaseFrequency::Every { count, unit } => count as u64 * unit.seconds(),
        }
    }

    /// Cadences dense enough that a chart draws them as a straight line.
    pub const fn is_high_frequency(self) -> bool {
        matches!(
            self,
            ReleaseFrequency::Continuous | ReleaseFrequency::Minute | ReleaseFrequency::Hourly
        )
    }

    /// Builds a custom cadence, rejecting `count == 0`.
    pub fn every(count: u32, unit: FrequencyUnit) -> Result<Self, ScheduleError> {
        if count == 0 {
            return Err(ScheduleError::Invalid("release frequency count must be >= 1"));
        }
        Ok(ReleaseFrequency::Every { count, unit })
    }
}

impl fmt::Display for ReleaseFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseFrequency::Continuous => f.write_str("continuous"),
            ReleaseFrequency::Minute => f.write_str("minute"),
            ReleaseFrequency::Hourly => f.write_str("hourly"),
            ReleaseFrequency::Daily => f.write_str("daily"),
            ReleaseFrequency::Weekly => f.write_str("weekly"),
            ReleaseFrequency::Monthly => f.write_str("monthly"),
            ReleaseFrequency::Quarterly => f.write_str("quarterly"),
            ReleaseFrequency::Yearly => f.write_str("yearly"),
            ReleaseFrequency::Every { count: 1, unit } => write!(f, "every-1-{}", unit.singular()),
            ReleaseFrequency::Every { count, unit } => {
                write!(f, "every-{}-{}s", count, unit.singular())
            }
        }
    }
}

impl FromStr for ReleaseFrequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ScheduleError::UnknownFrequency(s.to_string());
        let fixed = match s.trim() {
            "continuous" => Some(ReleaseFrequency::Continuous),
            "minute" => Some(ReleaseFrequency::Minute),
            "hourly" => Some(ReleaseFrequency::Hourly),
            "daily" => Some(ReleaseFrequency::Daily),
            "weekly" => Some(ReleaseFrequency::Weekly),
            "monthly" => Some(ReleaseFrequency::Monthly),
            "quarterly" => Some(ReleaseFrequency::Quarterly),
            "yearly" => Some(ReleaseFrequency::Yearly),
            _ => None,
        };
        if let Some(f) = fixed {
            return Ok(f);
        }

        let rest = s.trim().strip_prefix("every-").ok_or_else(unknown)?;
        let (count, unit) = rest.split_once('-').ok_or_else(unknown)?;
        let count: u32 = count.parse().map_err(|_| unknown())?;
        let unit = FrequencyUnit::parse(unit).ok_or_else(unknown)?;
        ReleaseFrequency::every(count, unit)
    }
}

impl TryFrom<String> for ReleaseFrequency {
    type Error = ScheduleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ReleaseFrequency> for String {
    fn from(f: ReleaseFrequency) -> Self {
        f.to_string()
    }
}

/// Number of release events between `from` and `to`.
///
/// The span is divided by the cadence interval and rounded half-up, so 29.5
/// days at a daily cadence counts 30 releases. An empty span gives 0; an
/// inverted one is rejected.
pub fn count_releases(
    frequency: ReleaseFrequency,
    from: Timestamp,
    to: Timestamp,
) -> Result<u64, ScheduleError> {
    let span = (to - from).num_seconds();
    if span < 0 {
        return Err(ScheduleError::InvertedRange);
    }
    let interval = frequency.interval_seconds();
    if interval == 0 {
        return Err(ScheduleError::Invalid("release interval must be > 0"));
    }

    // round(span / interval) == floor((2 * span + interval) / (2 * interval))
    let span = span as u128;
    let interval = interval as u128;
    let count = (2 * span + interval) / (2 * interval);
    u64::try_from(count).map_err(|_| ScheduleError::Overflow)
}

/* ---------------------------------- TESTS ---------------------------------- */
