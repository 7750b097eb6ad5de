//! Splitting the vested total into the cliff lump sum and per-release amounts.
//!
//! All arithmetic is decimal. Per-release amounts carry six decimal places
//! and are rounded away from zero, so `cliff + release * n` never falls short
//! of the total; the series builder caps the last step instead.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{Amount, CliffDuration, ScheduleError};

/// Decimal places kept on the per-release amount.
pub const RELEASE_AMOUNT_DP: u32 = 6;

/// Lump sum unlocked at the cliff: `total * percent / 100`.
///
/// Zero whenever the schedule has no cliff, whatever percentage was entered.
pub fn allocate_cliff_amount(
    cliff: CliffDuration,
    lump_sum_percent: Decimal,
    total: Amount,
) -> Result<Amount, ScheduleError> {
    if total <= Decimal::ZERO {
        return Err(ScheduleError::NonPositiveAmount(total));
    }
    if !cliff.is_enabled() {
        return Ok(Decimal::ZERO);
    }
    if lump_sum_percent.is_sign_negative() || lump_sum_percent >= Decimal::ONE_HUNDRED {
        return Err(ScheduleError::LumpSumOutOfRange(lump_sum_percent));
    }
    if lump_sum_percent.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let cliff_amount = total
        .checked_mul(lump_sum_percent)
        .and_then(|x| x.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(ScheduleError::Overflow)?;
    if cliff_amount > total {
        return Err(ScheduleError::CliffExceedsTotal { cliff: cliff_amount, total });
    }
    Ok(cliff_amount.normalize())
}

/// Amount released at each interval: `(total - cliff) / releases`, six decimal
/// places, rounded up. Zero releases means a cliff-only schedule and yields 0.
pub fn allocate_release_amount(
    total: Amount,
    cliff_amount: Amount,
    number_of_releases: u64,
) -> Result<Amount, ScheduleError> {
    if cliff_amount.is_sign_negative() {
        return Err(ScheduleError::Invalid("cliff amount must be >= 0"));
    }
    if cliff_amount > total {
        return Err(ScheduleError::CliffExceedsTotal { cliff: cliff_amount, total });
    }
    if number_of_releases == 0 {
        return Ok(Decimal::ZERO);
    }

    let linear = total
        .checked_sub(cliff_amount)
        .ok_or(ScheduleError::Overflow)?;
    let per_release = linear
        .checked_div(Decimal::from(number_of_releases))
        .ok_or(ScheduleError::Overflow)?;
    Ok(per_release
        .round_dp_with_strategy(RELEASE_AMOUNT_DP, RoundingStrategy::AwayFromZero)
        .normalize())
}

/* ---------------------------------- TESTS ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn no_cliff_ignores_percentage() {
        for pct in ["0", "10", "99", "150", "-5"] {
            let a = allocate_cliff_amount(CliffDuration::NoCliff, d(pct), d("1000")).unwrap();
            assert_eq!(a, Decimal::ZERO, "pct {pct}");
        }
    }

    #[test]
    fn cliff_percentage_of_total() {
        assert_eq!(
            allocate_cliff_amount(CliffDuration::OneMonth, d("10"), d("12000")).unwrap(),
            d("1200")
        );
        assert_eq!(
            allocate_cliff_amount(CliffDuration::OneDay, d("12.5"), d("1000.01")).unwrap(),
            d("125.00125")
        );
        assert_eq!(
            allocate_cliff_amount(CliffDuration::OneYear, d("0"), d("500")).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn large_amounts_keep_precision() {
        let total = d("123456789012345678.123456");
        let cliff = allocate_cliff_amount(CliffDuration::SixMonths, d("25"), total).unwrap();
        assert_eq!(cliff, d("30864197253086419.530864"));
    }

    #[test]
    fn invalid_percentage_and_total() {
        assert_eq!(
            allocate_cliff_amount(CliffDuration::OneMonth, d("100"), d("10")),
            Err(ScheduleError::LumpSumOutOfRange(d("100")))
        );
        assert_eq!(
            allocate_cliff_amount(CliffDuration::OneMonth, d("-1"), d("10")),
            Err(ScheduleError::LumpSumOutOfRange(d("-1")))
        );
        assert_eq!(
            allocate_cliff_amount(CliffDuration::OneMonth, d("10"), Decimal::ZERO),
            Err(ScheduleError::NonPositiveAmount(Decimal::ZERO))
        );
    }

    #[test]
    fn release_amount_rounds_up_at_sixth_place() {
        assert_eq!(allocate_release_amount(d("12000"), d("1200"), 11).unwrap(), d("981.818182"));
        // 1000 / 3 = 333.3333333… would be 333.333333 under half-up.
        assert_eq!(allocate_release_amount(d("1000"), Decimal::ZERO, 3).unwrap(), d("333.333334"));
        assert_eq!(allocate_release_amount(d("1000"), Decimal::ZERO, 4).unwrap(), d("250"));
    }

    #[test]
    fn release_amount_never_under_allocates() {
        let total = d("1000");
        for n in 1..=400u64 {
            let r = allocate_release_amount(total, d("37.5"), n).unwrap();
            let allocated = d("37.5") + r * Decimal::from(n);
            assert!(allocated >= total, "n={n}");
            assert!(allocated - total <= d("0.000001") * Decimal::from(n), "n={n}");
        }
    }

    #[test]
    fn zero_releases_is_cliff_only() {
        assert_eq!(allocate_release_amount(d("1000"), d("100"), 0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn cliff_larger_than_total_is_rejected() {
        assert_eq!(
            allocate_release_amount(d("10"), d("11"), 5),
            Err(ScheduleError::CliffExceedsTotal { cliff: d("11"), total: d("10") })
        );
    }
}
