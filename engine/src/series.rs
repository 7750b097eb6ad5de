//! Chart series for a vesting schedule.
//!
//! Two series are produced: the cliff step and the release curve that
//! continues from it. Dense schedules collapse to a straight two-point line;
//! sparse ones are drawn as a staircase with one point per release.

use chrono::{SecondsFormat, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Amount, CliffDuration, ReleaseFrequency, Timestamp};

/// Above this many releases the staircase is replaced by a straight line.
pub const MAX_STEPPED_RELEASES: u64 = 60;

/// One chart point. Dates are second-precision RFC 3339 UTC strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: Amount,
}

impl SeriesPoint {
    fn new(at: Timestamp, value: Amount) -> Self {
        Self { date: format_timestamp(at), value }
    }
}

/// How a chart should join consecutive release points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    Stepped,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSeries {
    pub cliff: Vec<SeriesPoint>,
    pub release: Vec<SeriesPoint>,
    pub interpolation: Interpolation,
}

impl ScheduleSeries {
    /// Nothing to draw yet.
    pub fn is_empty(&self) -> bool {
        self.cliff.is_empty() && self.release.is_empty()
    }
}

/// Inputs of [`build_schedule_series`]. Dates are optional because the form
/// feeding them is often half filled.
#[derive(Clone, Debug)]
pub struct SeriesParams {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub cliff_date: Option<Timestamp>,
    pub cliff_duration: CliffDuration,
    pub cliff_amount: Amount,
    pub frequency: ReleaseFrequency,
    pub number_of_releases: u64,
    pub release_amount: Amount,
    /// Falls back to `end` when absent.
    pub projected_end: Option<Timestamp>,
    pub total_amount: Amount,
}

/// Second-precision RFC 3339 in UTC, e.g. `2024-02-01T00:00:00Z`.
pub fn format_timestamp(t: Timestamp) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build the cliff and release series.
///
/// Returns an empty series when `start`, `end` or `cliff_date` is missing.
/// A staircase whose release dates would leave chrono's date range is drawn
/// as the straight line instead of being cut short.
pub fn build_schedule_series(params: &SeriesParams) -> ScheduleSeries {
    let (Some(start), Some(end), Some(cliff_date)) = (params.start, params.end, params.cliff_date)
    else {
        return ScheduleSeries::default();
    };
    let projected_end = params.projected_end.unwrap_or(end);

    let (cliff, seed) = if params.cliff_duration.is_enabled() {
        (
            vec![
                SeriesPoint::new(start, Decimal::ZERO),
                SeriesPoint::new(cliff_date, params.cliff_amount),
            ],
            (cliff_date, params.cliff_amount),
        )
    } else {
        (Vec::new(), (start, Decimal::ZERO))
    };

    let collapse = params.frequency.is_high_frequency()
        || params.number_of_releases > MAX_STEPPED_RELEASES
        || params.number_of_releases == 0;

    let stepped = if collapse { None } else { stepped_release(seed, params) };
    match stepped {
        Some(release) => ScheduleSeries { cliff, release, interpolation: Interpolation::Stepped },
        None => ScheduleSeries {
            cliff,
            release: vec![
                SeriesPoint::new(seed.0, seed.1),
                SeriesPoint::new(projected_end, params.total_amount),
            ],
            interpolation: Interpolation::Linear,
        },
    }
}

/// Seed point followed by one point per release, each `interval_seconds`
/// after the previous one. Cumulative value is capped at the total, so the
/// last step absorbs the upward rounding of the per-release amount.
///
/// `None` if a release date or the running sum leaves its range.
fn stepped_release(
    seed: (Timestamp, Amount),
    params: &SeriesParams,
) -> Option<Vec<SeriesPoint>> {
    let step = i64::try_from(params.frequency.interval_seconds())
        .ok()
        .and_then(TimeDelta::try_seconds)?;

    let mut points = Vec::with_capacity(params.number_of_releases as usize + 1);
    points.push(SeriesPoint::new(seed.0, seed.1));

    (0..params.number_of_releases).try_fold(seed, |(date, amount), _| {
        let next_date = date.checked_add_signed(step)?;
        let next_amount = amount
            .checked_add(params.release_amount)?
            .min(params.total_amount);
        points.push(SeriesPoint::new(next_date, next_amount));
        Some((next_date, next_amount))
    })?;

    Some(points)
}

/* ---------------------------------- TESTS ---------------------------------- */
