//! Error type shared by every engine operation.

use rust_decimal::Decimal;

use crate::Timestamp;

/// Errors returned by schedule computations.
///
/// Incomplete input (a date not chosen yet) is not an error; the series and
/// preview entry points degrade to empty output instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Generic invalid argument with context.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// Vesting must end strictly after it starts.
    #[error("end {end} is not after start {start}")]
    EndNotAfterStart {
        /// Requested start instant.
        start: Timestamp,
        /// Requested end instant.
        end: Timestamp,
    },
    /// Total amount under the schedule must be positive.
    #[error("amount to be vested must be > 0, got {0}")]
    NonPositiveAmount(Decimal),
    /// Lump sum percentage outside `[0, 100)`.
    #[error("lump sum percentage must be in [0, 100), got {0}")]
    LumpSumOutOfRange(Decimal),
    /// Cliff instant falls after the nominal end of the schedule.
    #[error("cliff at {cliff} lands after end {end}")]
    CliffAfterEnd {
        /// Resolved cliff instant.
        cliff: Timestamp,
        /// Nominal end instant.
        end: Timestamp,
    },
    /// Cliff lump sum would exceed the total.
    #[error("cliff amount {cliff} exceeds total {total}")]
    CliffExceedsTotal {
        /// Computed cliff amount.
        cliff: Decimal,
        /// Total amount under the schedule.
        total: Decimal,
    },
    /// A range whose end precedes its start.
    #[error("range end precedes range start")]
    InvertedRange,
    /// Date or decimal arithmetic left the representable range.
    #[error("arithmetic overflow")]
    Overflow,
    /// Symbolic cliff duration that is not part of the closed set.
    #[error("unknown cliff duration `{0}`")]
    UnknownCliffDuration(String),
    /// Release frequency string that does not parse.
    #[error("unknown release frequency `{0}`")]
    UnknownFrequency(String),
}
