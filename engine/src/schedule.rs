//! Schedule configuration and the end-to-end computation pipeline.
//!
//! Pipeline: cliff instant → cliff amount → release count (cliff to nominal
//! end) → per-release amount → projected end (from the cliff instant) →
//! chart series. Each stage lives in its own module and can be called alone.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    allocate_cliff_amount, allocate_release_amount, build_schedule_series, count_releases,
    get_duration, project_end_date_time, resolve_cliff, Amount, CliffDuration, ReleaseFrequency,
    ScheduleError, ScheduleSeries, SeriesParams, Timestamp,
};

/// Validated input of a schedule computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfiguration {
    pub start_date_time: Timestamp,
    /// Nominal end, before alignment to release intervals.
    pub end_date_time: Timestamp,
    pub cliff_duration: CliffDuration,
    /// Percent of the total unlocked at the cliff, `0 <= p < 100`.
    /// Ignored for [`CliffDuration::NoCliff`].
    #[serde(default)]
    pub lump_sum_release_after_cliff: Decimal,
    pub release_frequency: ReleaseFrequency,
    pub amount_to_be_vested: Amount,
}

impl ScheduleConfiguration {
    /// Check the configuration invariants without computing anything.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.end_date_time <= self.start_date_time {
            return Err(ScheduleError::EndNotAfterStart {
                start: self.start_date_time,
                end: self.end_date_time,
            });
        }
        if self.amount_to_be_vested <= Decimal::ZERO {
            return Err(ScheduleError::NonPositiveAmount(self.amount_to_be_vested));
        }
        if self.cliff_duration.is_enabled() {
            let pct = self.lump_sum_release_after_cliff;
            if pct.is_sign_negative() || pct >= Decimal::ONE_HUNDRED {
                return Err(ScheduleError::LumpSumOutOfRange(pct));
            }
        }
        Ok(())
    }

    /// Lump sum percentage as the allocator sees it (0 without a cliff).
    pub fn effective_lump_sum(&self) -> Decimal {
        if self.cliff_duration.is_enabled() {
            self.lump_sum_release_after_cliff
        } else {
            Decimal::ZERO
        }
    }
}

/// Everything derived from a [`ScheduleConfiguration`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedSchedule {
    pub start_date_time: Timestamp,
    pub cliff_duration: CliffDuration,
    pub release_frequency: ReleaseFrequency,
    pub amount_to_be_vested: Amount,
    /// `start + cliff`, equal to the start without a cliff.
    pub cliff_date_time: Timestamp,
    pub cliff_amount: Amount,
    pub number_of_releases: u64,
    pub release_amount: Amount,
    pub interval_seconds: u64,
    /// End shown to users; the last release lands exactly here.
    pub projected_end_date_time: Timestamp,
    /// Human-readable length from start to projected end.
    pub duration: String,
    pub series: ScheduleSeries,
}

/// Run the whole pipeline for a complete configuration.
pub fn compute_schedule(config: &ScheduleConfiguration) -> Result<ComputedSchedule, ScheduleError> {
    config.validate()?;

    let start = config.start_date_time;
    let end = config.end_date_time;
    let frequency = config.release_frequency;
    let total = config.amount_to_be_vested;

    let cliff_date_time = resolve_cliff(start, config.cliff_duration)?;
    if cliff_date_time > end {
        return Err(ScheduleError::CliffAfterEnd { cliff: cliff_date_time, end });
    }

    let cliff_amount =
        allocate_cliff_amount(config.cliff_duration, config.effective_lump_sum(), total)?;
    let number_of_releases = count_releases(frequency, cliff_date_time, end)?;
    let release_amount = allocate_release_amount(total, cliff_amount, number_of_releases)?;
    let interval_seconds = frequency.interval_seconds();
    let projected_end_date_time =
        project_end_date_time(cliff_date_time, end, number_of_releases, interval_seconds)?;

    let series = build_schedule_series(&SeriesParams {
        start: Some(start),
        end: Some(end),
        cliff_date: Some(cliff_date_time),
        cliff_duration: config.cliff_duration,
        cliff_amount,
        frequency,
        number_of_releases,
        release_amount,
        projected_end: Some(projected_end_date_time),
        total_amount: total,
    });

    Ok(ComputedSchedule {
        start_date_time: start,
        cliff_duration: config.cliff_duration,
        release_frequency: frequency,
        amount_to_be_vested: total,
        cliff_date_time,
        cliff_amount,
        number_of_releases,
        release_amount,
        interval_seconds,
        projected_end_date_time,
        duration: get_duration(start, projected_end_date_time),
        series,
    })
}

/// Partially filled schedule, as held by an editing form.
///
/// [`build`](Self::build) requires every field; [`preview`](Self::preview)
/// treats missing fields as "nothing to show yet".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleBuilder {
    start_date_time: Option<Timestamp>,
    end_date_time: Option<Timestamp>,
    cliff_duration: Option<CliffDuration>,
    lump_sum_release_after_cliff: Option<Decimal>,
    release_frequency: Option<ReleaseFrequency>,
    amount_to_be_vested: Option<Amount>,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, t: Timestamp) -> Self {
        self.start_date_time = Some(t);
        self
    }
    pub fn end(mut self, t: Timestamp) -> Self {
        self.end_date_time = Some(t);
        self
    }
    pub fn cliff(mut self, c: CliffDuration) -> Self {
        self.cliff_duration = Some(c);
        self
    }
    pub fn lump_sum_percent(mut self, p: Decimal) -> Self {
        self.lump_sum_release_after_cliff = Some(p);
        self
    }
    pub fn frequency(mut self, f: ReleaseFrequency) -> Self {
        self.release_frequency = Some(f);
        self
    }
    pub fn amount(mut self, a: Amount) -> Self {
        self.amount_to_be_vested = Some(a);
        self
    }

    /// `None` while any required field is unset. A missing cliff means
    /// [`CliffDuration::NoCliff`] and a missing lump sum means 0.
    pub fn complete(&self) -> Option<ScheduleConfiguration> {
        Some(ScheduleConfiguration {
            start_date_time: self.start_date_time?,
            end_date_time: self.end_date_time?,
            cliff_duration: self.cliff_duration.unwrap_or(CliffDuration::NoCliff),
            lump_sum_release_after_cliff: self.lump_sum_release_after_cliff.unwrap_or_default(),
            release_frequency: self.release_frequency?,
            amount_to_be_vested: self.amount_to_be_vested?,
        })
    }

    /// Build a configuration validating invariants.
    pub fn build(self) -> Result<ScheduleConfiguration, ScheduleError> {
        let config = ScheduleConfiguration {
            start_date_time: self
                .start_date_time
                .ok_or(ScheduleError::Invalid("start_date_time"))?,
            end_date_time: self
                .end_date_time
                .ok_or(ScheduleError::Invalid("end_date_time"))?,
            cliff_duration: self.cliff_duration.unwrap_or(CliffDuration::NoCliff),
            lump_sum_release_after_cliff: self.lump_sum_release_after_cliff.unwrap_or_default(),
            release_frequency: self
                .release_frequency
                .ok_or(ScheduleError::Invalid("release_frequency"))?,
            amount_to_be_vested: self
                .amount_to_be_vested
                .ok_or(ScheduleError::Invalid("amount_to_be_vested"))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Compute the schedule if the form is complete.
    ///
    /// Incomplete input gives `Ok(None)`; a complete but invalid one is
    /// still an error.
    pub fn preview(&self) -> Result<Option<ComputedSchedule>, ScheduleError> {
        self.complete().map(|c| compute_schedule(&c)).transpose()
    }
}

/* ---------------------------------- TESTS ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpolation;
    use chrono::{TimeDelta, TimeZone, Utc};
    use core::str::FromStr;

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn yearly_grant() -> ScheduleBuilder {
        ScheduleBuilder::new()
            .start(at(2024, 1, 1))
            .end(at(2025, 1, 1))
            .cliff(CliffDuration::OneMonth)
            .lump_sum_percent(dec("10"))
            .frequency(ReleaseFrequency::Monthly)
            .amount(dec("12000"))
    }

    #[test]
    fn monthly_grant_with_one_month_cliff() {
        let config = yearly_grant().build().unwrap();
        let s = compute_schedule(&config).unwrap();

        assert_eq!(s.cliff_date_time, at(2024, 2, 1));
        assert_eq!(s.cliff_amount, dec("1200"));
        assert_eq!(s.number_of_releases, 11);
        assert_eq!(s.release_amount, dec("981.818182"));
        assert_eq!(
            s.projected_end_date_time,
            at(2024, 2, 1) + TimeDelta::try_seconds(11 * 2_629_746).unwrap()
        );
        assert_eq!(s.interval_seconds, 2_629_746);
        assert_eq!(s.series.interpolation, Interpolation::Stepped);
        assert_eq!(s.series.release.last().unwrap().value, dec("12000"));
        assert_eq!(s.duration, "11 months, 30 days, 19 hours");
    }

    #[test]
    fn continuous_without_cliff() {
        let config = ScheduleBuilder::new()
            .start(at(2024, 1, 1))
            .end(at(2024, 4, 1))
            .lump_sum_percent(dec("40"))
            .frequency(ReleaseFrequency::Continuous)
            .amount(dec("1000"))
            .build()
            .unwrap();
        let s = compute_schedule(&config).unwrap();

        assert_eq!(s.cliff_date_time, at(2024, 1, 1));
        assert_eq!(s.cliff_amount, Decimal::ZERO);
        assert_eq!(s.number_of_releases, 91 * 86_400);
        assert_eq!(s.projected_end_date_time, at(2024, 4, 1));
        assert!(s.series.cliff.is_empty());
        assert_eq!(s.series.release.len(), 2);
        assert_eq!(s.series.release[0].value, Decimal::ZERO);
        assert_eq!(s.series.release[1].value, dec("1000"));
        assert_eq!(s.series.release[1].date, "2024-04-01T00:00:00Z");
    }

    #[test]
    fn invalid_configurations_fail_fast() {
        let inverted = yearly_grant().end(at(2023, 1, 1)).build();
        assert!(matches!(inverted, Err(ScheduleError::EndNotAfterStart { .. })));

        let same = yearly_grant().end(at(2024, 1, 1)).build();
        assert!(matches!(same, Err(ScheduleError::EndNotAfterStart { .. })));

        let empty = yearly_grant().amount(Decimal::ZERO).build();
        assert_eq!(empty, Err(ScheduleError::NonPositiveAmount(Decimal::ZERO)));

        let greedy = yearly_grant().lump_sum_percent(dec("100")).build();
        assert_eq!(greedy, Err(ScheduleError::LumpSumOutOfRange(dec("100"))));

        let missing = ScheduleBuilder::new().start(at(2024, 1, 1)).build();
        assert_eq!(missing, Err(ScheduleError::Invalid("end_date_time")));
    }

    #[test]
    fn out_of_range_percent_is_ignored_without_cliff() {
        let config = yearly_grant()
            .cliff(CliffDuration::NoCliff)
            .lump_sum_percent(dec("250"))
            .build()
            .unwrap();
        assert_eq!(compute_schedule(&config).unwrap().cliff_amount, Decimal::ZERO);
    }

    #[test]
    fn cliff_beyond_end_is_rejected() {
        let config = yearly_grant()
            .end(at(2024, 3, 1))
            .cliff(CliffDuration::SixMonths)
            .build()
            .unwrap();
        assert_eq!(
            compute_schedule(&config),
            Err(ScheduleError::CliffAfterEnd { cliff: at(2024, 7, 1), end: at(2024, 3, 1) })
        );
    }

    #[test]
    fn preview_of_incomplete_form_is_empty() {
        let draft = ScheduleBuilder::new()
            .start(at(2024, 1, 1))
            .frequency(ReleaseFrequency::Weekly)
            .amount(dec("50"));
        assert_eq!(draft.preview(), Ok(None));

        let draft = draft.end(at(2024, 3, 1));
        let preview = draft.preview().unwrap().unwrap();
        assert_eq!(preview.number_of_releases, 9);
    }

    #[test]
    fn preview_of_invalid_form_still_errors() {
        let draft = yearly_grant().end(at(2023, 6, 1));
        assert!(matches!(draft.preview(), Err(ScheduleError::EndNotAfterStart { .. })));
    }

    #[test]
    fn configuration_reads_camel_case_records() {
        let json = r#"{
            "startDateTime": "2024-01-01T00:00:00Z",
            "endDateTime": "2025-01-01T00:00:00Z",
            "cliffDuration": "1-month",
            "lumpSumReleaseAfterCliff": "10",
            "releaseFrequency": "monthly",
            "amountToBeVested": "12000"
        }"#;
        let config: ScheduleConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config, yearly_grant().build().unwrap());

        let draft: ScheduleBuilder =
            serde_json::from_str(r#"{ "startDateTime": "2024-01-01T00:00:00Z" }"#).unwrap();
        assert_eq!(draft.preview(), Ok(None));
    }
}
