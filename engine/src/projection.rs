//! Aligning the schedule end to whole release intervals.

use chrono::TimeDelta;

use crate::{ScheduleError, Timestamp};

/// End instant on which the last of `number_of_releases` intervals lands.
///
/// When `end - start` is already a multiple of `interval_seconds` the nominal
/// end is returned untouched. Otherwise the end moves by
/// `interval * releases - (end - start)`, which places it at exactly
/// `start + releases * interval`. Because release counts are rounded
/// half-up, that move is forward or backward by less than one interval.
pub fn project_end_date_time(
    start: Timestamp,
    end: Timestamp,
    number_of_releases: u64,
    interval_seconds: u64,
) -> Result<Timestamp, ScheduleError> {
    if interval_seconds == 0 {
        return Err(ScheduleError::Invalid("release interval must be > 0"));
    }
    let interval = i64::try_from(interval_seconds).map_err(|_| ScheduleError::Overflow)?;
    let difference = (end - start).num_seconds();

    if difference.rem_euclid(interval) == 0 {
        return Ok(end);
    }

    let releases = i64::try_from(number_of_releases).map_err(|_| ScheduleError::Overflow)?;
    let adjustment = interval
        .checked_mul(releases)
        .and_then(|span| span.checked_sub(difference))
        .ok_or(ScheduleError::Overflow)?;
    let delta = TimeDelta::try_seconds(adjustment).ok_or(ScheduleError::Overflow)?;
    end.checked_add_signed(delta).ok_or(ScheduleError::Overflow)
}

/* ---------------------------------- TESTS ---------------------------------- */
