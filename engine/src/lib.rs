//! Vesting schedule engine.
//!
//! Features:
//! - Calendar-aware cliff resolution from a closed set of cliff lengths.
//! - Release counting on a fixed cadence table with half-up rounding.
//! - Decimal amount allocation: cliff lump sum plus per-release amounts
//!   rounded up at six decimal places so nothing is left undistributed.
//! - End-date projection onto whole release intervals.
//! - Chart series (cliff step + linear or stepped release curve).
//! - Point-in-time queries: vested, claimable, next unlock.
//!
//! Time model: `DateTime<Utc>`; release cadences are fixed numbers of seconds.
//! Every function is pure and deterministic; nothing here logs or performs I/O.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub mod allocation;
pub mod cliff;
pub mod error;
pub mod frequency;
pub mod projection;
pub mod schedule;
pub mod series;
pub mod timeline;

pub use allocation::{allocate_cliff_amount, allocate_release_amount, RELEASE_AMOUNT_DP};
pub use cliff::{get_duration, resolve_cliff, CalendarDuration, CliffDuration};
pub use error::ScheduleError;
pub use frequency::{count_releases, FrequencyUnit, ReleaseFrequency};
pub use projection::project_end_date_time;
pub use schedule::{compute_schedule, ComputedSchedule, ScheduleBuilder, ScheduleConfiguration};
pub use series::{
    build_schedule_series, format_timestamp, Interpolation, ScheduleSeries, SeriesParams,
    SeriesPoint, MAX_STEPPED_RELEASES,
};
pub use timeline::UnlockEvent;

/// Token quantity.
pub type Amount = Decimal;

/// Instant in UTC.
pub type Timestamp = DateTime<Utc>;
